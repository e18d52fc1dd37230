#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;
use sp_std::vec::Vec;

pub mod traits;

#[cfg(test)]
mod mock;


/// Token ids are allocated sequentially at mint, starting from zero.
pub type TokenId = u64;

#[frame_support::pallet]
pub mod pallet
{
	use super::*;
	use frame_support::pallet_prelude::*;
	use frame_system::pallet_prelude::*;
	use sp_runtime::traits::StaticLookup;
	use crate::traits::{TokenInspect, TransferHandler};

	type AccountIdLookupOf<T> = <<T as frame_system::Config>::Lookup as StaticLookup>::Source;
	type TokenUri<T> = BoundedVec<u8, <T as Config>::MaxUriLength>;

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

		/// The origin permitted to mint new tokens.
		type MintOrigin: EnsureOrigin<Self::RuntimeOrigin>;

		/// Notified of every completed ownership change, within the transfer
		/// transaction.
		type TransferHandler: TransferHandler<Self::AccountId>;

		/// The maximum length of a token metadata uri.
		#[pallet::constant]
		type MaxUriLength: Get<u32>;
	}

	#[pallet::event]
	#[pallet::generate_deposit(pub(super) fn deposit_event)]
	pub enum Event<T: Config>
	{
		/// A new token was minted.
		TokenMinted {
			/// The token id.
			token_id: TokenId,
			/// The initial owner.
			to: T::AccountId
		},

		/// A token changed owners.
		TokenTransferred {
			/// The token id.
			token_id: TokenId,
			/// The previous owner.
			from: T::AccountId,
			/// The new owner.
			to: T::AccountId
		}
	}

	#[pallet::error]
	pub enum Error<T>
	{
		/// Token has never been minted.
		UnknownToken,

		/// Sender does not own the token.
		NotOwner,

		/// Recipient may not receive the token.
		InvalidRecipient,

		/// The metadata uri exceeds the permitted length.
		MalformedUri
	}

	/// The next token id to be allocated; doubles as the count of tokens
	/// minted to date.
	#[pallet::storage]
	#[pallet::getter(fn minted_count)]
	pub type NextTokenId<T: Config> = StorageValue<_, TokenId, ValueQuery>;

	/// Map of token ids to their current owner.
	#[pallet::storage]
	#[pallet::getter(fn owners)]
	pub type Owners<T: Config> = StorageMap<_, Twox64Concat, TokenId, T::AccountId>;

	/// Map of accounts to the token ids they currently hold.
	#[pallet::storage]
	#[pallet::getter(fn tokens_of)]
	pub type OwnedTokens<T: Config> = StorageMap<
		_,
		Blake2_128Concat,
		T::AccountId,
		Vec<TokenId>,
		ValueQuery
	>;

	/// Map of token ids to their metadata uri.
	#[pallet::storage]
	#[pallet::getter(fn token_uri)]
	pub type TokenUris<T: Config> = StorageMap<_, Twox64Concat, TokenId, TokenUri<T>>;

	#[pallet::call]
	impl<T: Config> Pallet<T>
	{
		/// Mint a new token for `to`, carrying an opaque metadata uri.
		///
		/// - `to`: The initial owner of the token.
		/// - `uri`: Opaque metadata reference associated with the token.
		///
		/// Emits `TokenMinted`.
		#[pallet::call_index(0)]
		#[pallet::weight(T::DbWeight::get().reads_writes(2, 4))]
		pub fn safe_mint(
			origin: OriginFor<T>,
			to: AccountIdLookupOf<T>,
			uri: Vec<u8>
		) -> DispatchResult
		{
			// Minting is reserved for the configured authority.
			T::MintOrigin::ensure_origin(origin)?;
			let to = T::Lookup::lookup(to)?;

			let uri: TokenUri<T> = uri
				.try_into()
				.map_err(|_| Error::<T>::MalformedUri)?;

			// Allocate the next sequential id.
			let token_id = NextTokenId::<T>::get();
			NextTokenId::<T>::put(token_id.saturating_add(1));

			Owners::<T>::insert(token_id, &to);
			OwnedTokens::<T>::append(&to, token_id);
			TokenUris::<T>::insert(token_id, uri);

			Self::deposit_event(Event::TokenMinted { token_id, to });

			Ok(())
		}

		/// Transfer a token from the caller to `to`.
		///
		/// The configured transfer handler runs inside the same storage
		/// transaction as the ownership change: if the handler fails, the
		/// whole transfer fails with no partial state.
		///
		/// - `to`: The new owner of the token.
		/// - `token_id`: The token to transfer.
		///
		/// Emits `TokenTransferred`.
		#[pallet::call_index(1)]
		#[pallet::weight(T::DbWeight::get().reads_writes(3, 3))]
		pub fn transfer(
			origin: OriginFor<T>,
			to: AccountIdLookupOf<T>,
			token_id: TokenId
		) -> DispatchResult
		{
			// Check that the extrinsic was signed and get the signer.
			let from = ensure_signed(origin)?;
			let to = T::Lookup::lookup(to)?;

			frame_support::storage::with_storage_layer(|| {
				let owner = Owners::<T>::get(token_id).ok_or(Error::<T>::UnknownToken)?;
				ensure!(owner == from, Error::<T>::NotOwner);
				ensure!(to != from, Error::<T>::InvalidRecipient);

				// Reassign ownership before notifying the handler, so the
				// handler observes the post-transfer owner maps.
				Owners::<T>::insert(token_id, &to);
				OwnedTokens::<T>::mutate(&from, |ids| ids.retain(|id| *id != token_id));
				OwnedTokens::<T>::append(&to, token_id);

				// The handler completes within the transfer's atomicity
				// boundary; an error here aborts the ownership change.
				T::TransferHandler::on_token_transfer(&from, &to, token_id)?;

				Self::deposit_event(Event::TokenTransferred { token_id, from, to });

				Ok(())
			})
		}
	}

	impl<T: Config> Pallet<T>
	{
		/// Returns the current owner of `token_id`.
		pub fn owner_of(token_id: TokenId) -> Result<T::AccountId, DispatchError>
		{
			Owners::<T>::get(token_id).ok_or(Error::<T>::UnknownToken.into())
		}

		/// Returns the number of tokens currently held by `who`.
		pub fn balance_of(who: &T::AccountId) -> u32
		{
			OwnedTokens::<T>::decode_len(who).unwrap_or(0) as u32
		}
	}

	impl<T: Config> TokenInspect<T::AccountId> for Pallet<T>
	{
		fn owner_of(token_id: TokenId) -> Option<T::AccountId>
		{
			Owners::<T>::get(token_id)
		}

		fn balance_of(who: &T::AccountId) -> u32
		{
			OwnedTokens::<T>::decode_len(who).unwrap_or(0) as u32
		}

		fn lowest_owned_token(who: &T::AccountId) -> Option<TokenId>
		{
			// Holdings are not kept sorted; transfers may append out of order.
			OwnedTokens::<T>::get(who).into_iter().min()
		}
	}
}
