//! `process_exchange` instruction and unsigned transaction assembly.

use sha2::{Digest, Sha256};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

use super::OpenOrder;

const ORDER_VAULT_ACCOUNT_SEED: &[u8] = b"order-vault-account";
const ORDER_VAULT_AUTH_SEED: &[u8] = b"order-vault-auth";
const OPEN_ORDER_COUNTER_SEED: &[u8] = b"open-order-counter";
const REGISTERED_CURRENCY_SEED: &[u8] = b"registered-currency";

/// Offset of `sa_currency_vault` inside a `RegisteredCurrency` account.
const SA_VAULT_OFFSET: usize = 8 + 32;

/// Anchor instruction discriminator: first 8 bytes of `sha256("global:<name>")`.
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Every account the exchange instruction touches.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeAccounts {
    pub order_taker: Pubkey,
    pub order_taker_deposit_token_account: Pubkey,
    pub order_taker_receive_token_account: Pubkey,
    pub currency_mint: Pubkey,
    pub asset_mint: Pubkey,
    pub order_initializer: Pubkey,
    pub initializer_deposit_token_account: Pubkey,
    pub initializer_receive_token_account: Pubkey,
    pub order_vault_account: Pubkey,
    pub order_vault_authority: Pubkey,
    pub order_account: Pubkey,
    pub sa_vault: Pubkey,
    pub registered_currency: Pubkey,
    pub open_orders_counter: Pubkey,
}

impl ExchangeAccounts {
    /// Accounts for `buyer` taking a sell `order`.
    pub fn for_sell_order(
        program_id: &Pubkey,
        order: &OpenOrder,
        buyer: &Pubkey,
        sa_vault: Pubkey,
    ) -> Self {
        let (order_vault_account, _) = Pubkey::find_program_address(
            &[
                ORDER_VAULT_ACCOUNT_SEED,
                order.initializer.as_ref(),
                order.asset_mint.as_ref(),
            ],
            program_id,
        );
        let (order_vault_authority, _) = Pubkey::find_program_address(
            &[ORDER_VAULT_AUTH_SEED, order.initializer.as_ref()],
            program_id,
        );
        let (open_orders_counter, _) = Pubkey::find_program_address(
            &[
                OPEN_ORDER_COUNTER_SEED,
                order.initializer.as_ref(),
                order.asset_mint.as_ref(),
            ],
            program_id,
        );

        Self {
            order_taker: *buyer,
            order_taker_deposit_token_account: get_associated_token_address(
                buyer,
                &order.currency_mint,
            ),
            order_taker_receive_token_account: get_associated_token_address(
                buyer,
                &order.asset_mint,
            ),
            currency_mint: order.currency_mint,
            asset_mint: order.asset_mint,
            order_initializer: order.initializer,
            initializer_deposit_token_account: order.initializer_asset_token_account,
            initializer_receive_token_account: order.initializer_currency_token_account,
            order_vault_account,
            order_vault_authority,
            order_account: order.id,
            sa_vault,
            registered_currency: registered_currency_address(program_id, &order.currency_mint),
            open_orders_counter,
        }
    }

    fn to_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.order_taker, true),
            AccountMeta::new(self.order_taker_deposit_token_account, false),
            AccountMeta::new(self.order_taker_receive_token_account, false),
            AccountMeta::new_readonly(self.currency_mint, false),
            AccountMeta::new_readonly(self.asset_mint, false),
            AccountMeta::new(self.order_initializer, false),
            AccountMeta::new(self.initializer_deposit_token_account, false),
            AccountMeta::new(self.initializer_receive_token_account, false),
            AccountMeta::new(self.order_vault_account, false),
            AccountMeta::new_readonly(self.order_vault_authority, false),
            AccountMeta::new(self.order_account, false),
            AccountMeta::new(self.sa_vault, false),
            AccountMeta::new_readonly(self.registered_currency, false),
            AccountMeta::new(self.open_orders_counter, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ]
    }
}

/// PDA holding the market's registration of `currency_mint`.
pub fn registered_currency_address(program_id: &Pubkey, currency_mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[REGISTERED_CURRENCY_SEED, currency_mint.as_ref()],
        program_id,
    )
    .0
}

/// Fee vault recorded in a `RegisteredCurrency` account.
pub fn sa_vault_from_registered_currency(data: &[u8]) -> Option<Pubkey> {
    let bytes = data.get(SA_VAULT_OFFSET..SA_VAULT_OFFSET + 32)?;
    Pubkey::try_from(bytes).ok()
}

/// `process_exchange(purchase_quantity, expected_price, seller)`.
pub fn process_exchange(
    program_id: &Pubkey,
    accounts: &ExchangeAccounts,
    purchase_quantity: u64,
    expected_price: u64,
) -> Instruction {
    // Borsh layout: u64 LE, u64 LE, 32-byte key.
    let mut data = instruction_discriminator("process_exchange").to_vec();
    data.extend_from_slice(&purchase_quantity.to_le_bytes());
    data.extend_from_slice(&expected_price.to_le_bytes());
    data.extend_from_slice(accounts.order_initializer.as_ref());

    Instruction {
        program_id: *program_id,
        accounts: accounts.to_metas(),
        data,
    }
}

/// Buyer-funded transaction with no signatures attached.
pub fn unsigned_transaction(
    program_id: &Pubkey,
    accounts: &ExchangeAccounts,
    purchase_quantity: u64,
    expected_price: u64,
    recent_blockhash: Hash,
) -> Transaction {
    let buyer = accounts.order_taker;
    let instructions = [
        create_associated_token_account_idempotent(
            &buyer,
            &buyer,
            &accounts.asset_mint,
            &spl_token::id(),
        ),
        process_exchange(program_id, accounts, purchase_quantity, expected_price),
    ];
    let mut message = Message::new(&instructions, Some(&buyer));
    message.recent_blockhash = recent_blockhash;
    Transaction::new_unsigned(message)
}
