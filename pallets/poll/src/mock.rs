use crate::*;
use crate as pallet_poll;
use core::time::Duration;
use frame_support::{
	derive_impl, parameter_types,
	traits::{ConstU32, ConstU64, UnixTime}
};
use sp_core::H256;
use sp_runtime::{
	traits::{BlakeTwo256, IdentityLookup},
	BuildStorage,
};

type Block = frame_system::mocking::MockBlock<Test>;

frame_support::construct_runtime!(
	pub enum Test
	{
		System: frame_system,
		Token: pallet_token,
		Voting: pallet_poll,
	}
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig as frame_system::DefaultConfig)]
impl frame_system::Config for Test {
	type BaseCallFilter = frame_support::traits::Everything;
	type BlockWeights = ();
	type BlockLength = ();
	type DbWeight = ();
	type RuntimeOrigin = RuntimeOrigin;
	type Nonce = u64;
	type Hash = H256;
	type RuntimeCall = RuntimeCall;
	type Hashing = BlakeTwo256;
	type AccountId = u64;
	type Lookup = IdentityLookup<Self::AccountId>;
	type Block = Block;
	type RuntimeEvent = RuntimeEvent;
	type BlockHashCount = ConstU64<250>;
	type Version = ();
	type PalletInfo = PalletInfo;
	type OnNewAccount = ();
	type OnKilledAccount = ();
	type SystemWeightInfo = ();
	type SS58Prefix = ();
	type OnSetCode = ();
	type MaxConsumers = frame_support::traits::ConstU32<16>;
}

parameter_types! {
	pub static CurrentTime: u64 = 1_000_000;
}

/// Mutable mock clock, in milliseconds.
pub struct MockTime;

impl UnixTime for MockTime
{
	fn now() -> Duration
	{
		Duration::from_millis(CurrentTime::get())
	}
}

impl pallet_token::Config for Test {
	type RuntimeEvent = RuntimeEvent;
	type MintOrigin = frame_system::EnsureRoot<u64>;
	type TransferHandler = Voting;
	type MaxUriLength = ConstU32<256>;
}

impl Config for Test {
	type RuntimeEvent = RuntimeEvent;
	type TimeProvider = MockTime;
	type Tokens = Token;
	type AdminOrigin = frame_system::EnsureRoot<u64>;
	type MaxPollOptions = ConstU32<32>;
	type MaxLabelLength = ConstU32<256>;
}

pub fn new_test_ext() -> sp_io::TestExternalities {
	let t = frame_system::GenesisConfig::<Test>::default()
		.build_storage()
		.unwrap();
	let mut ext: sp_io::TestExternalities = t.into();
	ext.execute_with(|| System::set_block_number(1));
	ext
}
