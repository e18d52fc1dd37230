use frame_support::pallet_prelude::*;

/// Poll ids are allocated sequentially, starting from zero.
pub type PollId = u32;

/// Milliseconds since the unix epoch.
pub type Timestamp = u64;

/// Index into a poll's option tallies.
pub type OptionIndex = u32;

pub type PollLabel<T> = BoundedVec<u8, <T as crate::Config>::MaxLabelLength>;
pub type OptionTallies<T> = BoundedVec<u64, <T as crate::Config>::MaxPollOptions>;

/// Poll storage definition.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
#[scale_info(skip_type_params(T))]
pub struct Poll<T: crate::Config>
{
	/// The poll id.
	pub index: PollId,

	/// Free-form poll label, possibly empty.
	pub label: PollLabel<T>,

	/// The poll creation time (in ms).
	pub created_at: Timestamp,

	/// The time at which the poll stops accepting votes (in ms).
	pub expires_at: Timestamp,

	/// Per-option vote counts; the option count is fixed at creation.
	pub tallies: OptionTallies<T>
}

pub trait PollProvider<T: crate::Config>: Sized
{
	/// The number of options voters may select between.
	fn option_count(&self) -> OptionIndex;

	/// Returns true iff `now` is at or past the poll's expiry time.
	fn is_expired(&self, now: Timestamp) -> bool;

	/// Count one additional ballot for `option_index`.
	fn add_ballot(self, option_index: OptionIndex) -> Option<Self>;

	/// Discount one previously counted ballot for `option_index`.
	fn retract_ballot(self, option_index: OptionIndex) -> Option<Self>;
}

impl<T: crate::Config> PollProvider<T> for Poll<T>
{
	fn option_count(&self) -> OptionIndex
	{
		self.tallies.len() as OptionIndex
	}

	fn is_expired(&self, now: Timestamp) -> bool
	{
		now >= self.expires_at
	}

	fn add_ballot(mut self, option_index: OptionIndex) -> Option<Self>
	{
		let tally = self.tallies.get_mut(option_index as usize)?;
		*tally = tally.saturating_add(1);
		Some(self)
	}

	fn retract_ballot(mut self, option_index: OptionIndex) -> Option<Self>
	{
		let tally = self.tallies.get_mut(option_index as usize)?;
		*tally = tally.saturating_sub(1);
		Some(self)
	}
}
