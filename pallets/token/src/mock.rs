use crate::*;
use crate as pallet_token;
use frame_support::{
	derive_impl, parameter_types,
	pallet_prelude::DispatchResult,
	traits::{ConstU32, ConstU64}
};
use sp_core::H256;
use sp_runtime::{
	traits::{BlakeTwo256, IdentityLookup},
	BuildStorage, DispatchError
};
use crate::traits::TransferHandler;

type Block = frame_system::mocking::MockBlock<Test>;

frame_support::construct_runtime!(
	pub enum Test
	{
		System: frame_system,
		Token: pallet_token,
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
	pub static HandlerShouldFail: bool = false;
}

/// Stands in for the poll engine. Records nothing, but can be switched to
/// fail so transfer rollback is observable.
pub struct MockHandler;

impl TransferHandler<u64> for MockHandler
{
	fn on_token_transfer(_from: &u64, _to: &u64, _token_id: TokenId) -> DispatchResult
	{
		if HandlerShouldFail::get()
		{
			return Err(DispatchError::Other("handler rejected transfer"));
		}
		Ok(())
	}
}

impl Config for Test {
	type RuntimeEvent = RuntimeEvent;
	type MintOrigin = frame_system::EnsureRoot<u64>;
	type TransferHandler = MockHandler;
	type MaxUriLength = ConstU32<256>;
}

pub fn new_test_ext() -> sp_io::TestExternalities {
	let t = frame_system::GenesisConfig::<Test>::default()
		.build_storage()
		.unwrap();
	let mut ext: sp_io::TestExternalities = t.into();
	ext.execute_with(|| System::set_block_number(1));
	ext
}
