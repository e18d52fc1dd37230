use frame_support::pallet_prelude::DispatchResult;
use crate::TokenId;

/// Synchronous observer of completed ownership changes.
///
/// The registry invokes the handler after its owner maps have been updated
/// but before the transfer is committed, so the handler's effects fall
/// inside the transfer's atomicity boundary: an error aborts the entire
/// transfer and rolls back the ownership change.
pub trait TransferHandler<AccountId>
{
	fn on_token_transfer(from: &AccountId, to: &AccountId, token_id: TokenId) -> DispatchResult;
}

impl<AccountId> TransferHandler<AccountId> for ()
{
	fn on_token_transfer(_from: &AccountId, _to: &AccountId, _token_id: TokenId) -> DispatchResult
	{
		Ok(())
	}
}

/// Read access to the token registry, for pallets gating behaviour on token holdings.
pub trait TokenInspect<AccountId>
{
	/// The current owner of `token_id`, if it has been minted.
	fn owner_of(token_id: TokenId) -> Option<AccountId>;

	/// The number of tokens currently held by `who`.
	fn balance_of(who: &AccountId) -> u32;

	/// The lowest token id currently held by `who`, if any.
	fn lowest_owned_token(who: &AccountId) -> Option<TokenId>;
}
