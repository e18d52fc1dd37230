#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;
use sp_std::vec::Vec;

pub mod types;

#[cfg(test)]
mod mock;


#[frame_support::pallet]
pub mod pallet
{
	use super::*;
	use frame_support::pallet_prelude::*;
	use frame_system::pallet_prelude::*;
	use frame_support::traits::UnixTime;
	use sp_runtime::traits::SaturatedConversion;
	use pallet_token::TokenId;
	use pallet_token::traits::{TokenInspect, TransferHandler};
	use crate::types::{OptionIndex, OptionTallies, Poll, PollId, PollLabel, PollProvider, Timestamp};

	const STORAGE_VERSION: StorageVersion = StorageVersion::new(0);

	#[pallet::pallet]
	#[pallet::storage_version(STORAGE_VERSION)]
	#[pallet::without_storage_info]
	pub struct Pallet<T>(_);

	#[pallet::config]
	pub trait Config: frame_system::Config
	{
		/// The overarching event type.
		type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

		/// Permit access to the current "timestamp" represented in milliseconds.
		type TimeProvider: UnixTime;

		/// Read access to the token registry conferring voting rights.
		type Tokens: TokenInspect<Self::AccountId>;

		/// The origin permitted to override poll expiry times.
		type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

		/// The maximum number of options a poll may carry.
		#[pallet::constant]
		type MaxPollOptions: Get<u32>;

		/// The maximum length of a poll label.
		#[pallet::constant]
		type MaxLabelLength: Get<u32>;
	}

	#[pallet::event]
	#[pallet::generate_deposit(pub(super) fn deposit_event)]
	pub enum Event<T: Config>
	{
		/// A new poll was created.
		PollCreated {
			/// The poll id.
			poll_id: PollId,
			/// The number of options.
			option_count: OptionIndex,
			/// The time the poll stops accepting votes.
			expires_at: Timestamp
		},

		/// A ballot was cast.
		VoteCast {
			/// The poll voted in.
			poll_id: PollId,
			/// The voter.
			who: T::AccountId,
			/// The chosen option.
			option_index: OptionIndex,
			/// The token recorded as the instrument of the vote.
			token_id: TokenId
		},

		/// A poll's expiry time was overridden.
		PollExpiryChanged {
			/// The poll id.
			poll_id: PollId,
			/// The new expiry time.
			expires_at: Timestamp
		},

		/// A ballot followed its instrument token to a new owner.
		VoteMigrated {
			/// The poll the ballot was cast in.
			poll_id: PollId,
			/// The previous holder of the ballot.
			from: T::AccountId,
			/// The new holder of the ballot.
			to: T::AccountId,
			/// The instrument token.
			token_id: TokenId
		},

		/// A ballot was discarded because the token's new owner had already
		/// voted in the poll.
		VoteDiscarded {
			/// The poll the ballot was cast in.
			poll_id: PollId,
			/// The previous holder of the ballot.
			from: T::AccountId,
			/// The instrument token.
			token_id: TokenId
		}
	}

	#[pallet::error]
	pub enum Error<T>
	{
		/// Poll does not exist.
		UnknownPoll,

		/// A poll needs at least two options, at most the configured maximum.
		InvalidOptionCount,

		/// Poll expiry must lie strictly in the future.
		InvalidExpiry,

		/// Poll is no longer accepting votes.
		PollExpired,

		/// Option index is outside the poll's option range.
		InvalidOption,

		/// Sender already holds a ballot in this poll.
		AlreadyVoted,

		/// Sender holds no tokens and therefore no voting rights.
		NoVotingRights,

		/// The poll label exceeds the permitted length.
		MalformedLabel
	}

	/// Map of ids to polls; the count doubles as the next poll id.
	#[pallet::storage]
	#[pallet::getter(fn polls)]
	pub type Polls<T: Config> = CountedStorageMap<
		_,
		Twox64Concat,
		PollId,
		Poll<T>
	>;

	/// Chosen option per poll and voter. Key presence is the authoritative
	/// "has voted" flag.
	#[pallet::storage]
	#[pallet::getter(fn vote_of)]
	pub type VoteRecords<T: Config> = StorageDoubleMap<
		_,
		Twox64Concat,
		PollId,
		Blake2_128Concat,
		T::AccountId,
		OptionIndex
	>;

	/// Map of token ids to the polls in which they are the instrument of a
	/// live ballot.
	#[pallet::storage]
	#[pallet::getter(fn token_participation)]
	pub type TokenParticipation<T: Config> = StorageMap<
		_,
		Twox64Concat,
		TokenId,
		Vec<PollId>,
		ValueQuery
	>;

	/// Map of accounts to the polls they currently hold a ballot in.
	#[pallet::storage]
	#[pallet::getter(fn voter_polls)]
	pub type VoterPolls<T: Config> = StorageMap<
		_,
		Blake2_128Concat,
		T::AccountId,
		Vec<PollId>,
		ValueQuery
	>;

	#[pallet::call]
	impl<T: Config> Pallet<T>
	{
		/// Create a new poll.
		///
		/// - `label`: Free-form label for the poll, possibly empty.
		/// - `option_count`: The number of options voters may select between.
		/// - `expires_at`: The time (in ms) at which the poll stops accepting votes.
		///
		/// Emits `PollCreated`.
		#[pallet::call_index(0)]
		#[pallet::weight(T::DbWeight::get().reads_writes(2, 1))]
		pub fn create_poll(
			origin: OriginFor<T>,
			label: Vec<u8>,
			option_count: OptionIndex,
			expires_at: Timestamp
		) -> DispatchResult
		{
			// Check that the extrinsic was signed.
			ensure_signed(origin)?;

			let label: PollLabel<T> = label
				.try_into()
				.map_err(|_| Error::<T>::MalformedLabel)?;

			// A poll needs at least two options to be decidable.
			ensure!(
				option_count >= 2 && option_count <= T::MaxPollOptions::get(),
				Error::<T>::InvalidOptionCount
			);

			// Expiry must lie strictly in the future.
			let now = Self::now();
			ensure!(expires_at > now, Error::<T>::InvalidExpiry);

			let mut tallies = OptionTallies::<T>::default();
			for _ in 0..option_count
			{
				tallies.try_push(0).map_err(|_| Error::<T>::InvalidOptionCount)?;
			}

			let poll_id = Polls::<T>::count();
			Polls::<T>::insert(poll_id, Poll {
				index: poll_id,
				label,
				created_at: now,
				expires_at,
				tallies
			});

			Self::deposit_event(Event::PollCreated { poll_id, option_count, expires_at });

			Ok(())
		}

		/// Cast a ballot in a poll. One ballot per account per poll, with a
		/// fixed weight of one regardless of the number of tokens held. The
		/// lowest token id currently held by the caller is recorded as the
		/// instrument of the vote; a later transfer of that token carries
		/// the ballot along to the new owner.
		///
		/// - `poll_id`: The poll to vote in.
		/// - `option_index`: The chosen option.
		///
		/// Emits `VoteCast`.
		#[pallet::call_index(1)]
		#[pallet::weight(T::DbWeight::get().reads_writes(4, 4))]
		pub fn cast_vote(
			origin: OriginFor<T>,
			poll_id: PollId,
			option_index: OptionIndex
		) -> DispatchResult
		{
			// Check that the extrinsic was signed and get the signer.
			let who = ensure_signed(origin)?;

			let poll = Polls::<T>::get(poll_id).ok_or(Error::<T>::UnknownPoll)?;

			// Expiry is evaluated lazily against the current time; polls are
			// never transitioned by a scheduled task.
			ensure!(!poll.is_expired(Self::now()), Error::<T>::PollExpired);

			ensure!(option_index < poll.option_count(), Error::<T>::InvalidOption);

			// Presence of a vote record is the authoritative "already voted"
			// flag.
			ensure!(
				!VoteRecords::<T>::contains_key(poll_id, &who),
				Error::<T>::AlreadyVoted
			);

			// Holding any token confers exactly one vote per poll.
			let token_id = T::Tokens::lowest_owned_token(&who)
				.ok_or(Error::<T>::NoVotingRights)?;

			let poll = poll.add_ballot(option_index).ok_or(Error::<T>::InvalidOption)?;
			Polls::<T>::insert(poll_id, poll);

			VoteRecords::<T>::insert(poll_id, &who, option_index);
			TokenParticipation::<T>::append(token_id, poll_id);
			VoterPolls::<T>::append(&who, poll_id);

			Self::deposit_event(Event::VoteCast { poll_id, who, option_index, token_id });

			Ok(())
		}

		/// Override a poll's expiry time, in either direction. Setting a
		/// past timestamp force-expires the poll.
		///
		/// - `poll_id`: The poll to adjust.
		/// - `expires_at`: The new expiry time (in ms), unvalidated.
		///
		/// Emits `PollExpiryChanged`.
		#[pallet::call_index(2)]
		#[pallet::weight(T::DbWeight::get().reads_writes(1, 1))]
		pub fn change_poll_time(
			origin: OriginFor<T>,
			poll_id: PollId,
			expires_at: Timestamp
		) -> DispatchResult
		{
			T::AdminOrigin::ensure_origin(origin)?;

			Polls::<T>::try_mutate(poll_id, |maybe_poll| {
				let poll = maybe_poll.as_mut().ok_or(Error::<T>::UnknownPoll)?;
				poll.expires_at = expires_at;
				Ok::<(), DispatchError>(())
			})?;

			Self::deposit_event(Event::PollExpiryChanged { poll_id, expires_at });

			Ok(())
		}
	}

	impl<T: Config> Pallet<T>
	{
		/// The current per-option vote counts of a poll.
		pub fn poll_options(poll_id: PollId) -> Option<Vec<u64>>
		{
			Polls::<T>::get(poll_id).map(|poll| poll.tallies.to_vec())
		}

		/// Returns true iff `who` currently holds a ballot in `poll_id`.
		pub fn is_voted(poll_id: PollId, who: &T::AccountId) -> bool
		{
			VoteRecords::<T>::contains_key(poll_id, who)
		}

		/// The polls in which `who` currently holds a ballot.
		pub fn voter_votings(who: &T::AccountId) -> Vec<PollId>
		{
			VoterPolls::<T>::get(who)
		}

		fn now() -> Timestamp
		{
			T::TimeProvider::now().as_millis().saturated_into()
		}
	}

	impl<T: Config> TransferHandler<T::AccountId> for Pallet<T>
	{
		/// Migrate the ballots instrumented by `token_id` from `from` to
		/// `to`. Total for every reachable state: an error here would abort
		/// the ownership transfer itself.
		fn on_token_transfer(
			from: &T::AccountId,
			to: &T::AccountId,
			token_id: TokenId
		) -> DispatchResult
		{
			// Polls for which the token remains the instrument of a ballot
			// after the transfer.
			let mut retained = Vec::new();

			for poll_id in TokenParticipation::<T>::get(token_id)
			{
				// The ballot leaves the sender unconditionally.
				let Some(option_index) = VoteRecords::<T>::take(poll_id, from) else { continue };
				VoterPolls::<T>::mutate(from, |ids| ids.retain(|id| *id != poll_id));

				if VoteRecords::<T>::contains_key(poll_id, to)
				{
					// The recipient already voted with another token; the
					// incoming ballot is discarded rather than double-counted.
					if let Some(poll) = Polls::<T>::get(poll_id)
					{
						if let Some(poll) = poll.retract_ballot(option_index)
						{
							Polls::<T>::insert(poll_id, poll);
						}
					}

					Self::deposit_event(Event::VoteDiscarded {
						poll_id,
						from: from.clone(),
						token_id
					});
				}
				else
				{
					// Move the record to the new owner; the tally is
					// untouched, so the counts are preserved while the vote
					// identity changes.
					VoteRecords::<T>::insert(poll_id, to, option_index);
					VoterPolls::<T>::append(to, poll_id);
					retained.push(poll_id);

					Self::deposit_event(Event::VoteMigrated {
						poll_id,
						from: from.clone(),
						to: to.clone(),
						token_id
					});
				}
			}

			if retained.is_empty()
			{
				TokenParticipation::<T>::remove(token_id);
			}
			else
			{
				TokenParticipation::<T>::insert(token_id, retained);
			}

			Ok(())
		}
	}
}
