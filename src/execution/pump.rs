//! Pump.fun `buy` transaction builder and sender.

use super::{BuyFill, BuyOrder, BuySubmitter, SubmitError};
use crate::domain::protocol::{
    associated_token_address, ASSOCIATED_TOKEN_PROGRAM, PUMP_FUN_EVENT_AUTHORITY,
    PUMP_FUN_FEE_RECIPIENT, PUMP_FUN_GLOBAL, PUMP_FUN_PROGRAM, TOKEN_DECIMALS, TOKEN_PROGRAM,
};
use crate::domain::Wallet;
use crate::engine::CurveDecoder;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::native_token::sol_to_lamports;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use solana_sdk::{system_program, sysvar};
use std::sync::Arc;
use tracing::{debug, info};

const BUY_DISCRIMINATOR: [u8; 8] = [0x66, 0x06, 0x3d, 0x12, 0x01, 0xda, 0xeb, 0xea];

/// `AssociatedTokenAccountInstruction::CreateIdempotent`.
const ATA_CREATE_IDEMPOTENT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyTuning {
    /// Extra SOL the buy may spend over the quote, in basis points.
    pub slippage_bps: u64,
    pub compute_unit_limit: u32,
    /// Priority fee in micro-lamports per compute unit.
    pub compute_unit_price: u64,
}

impl Default for BuyTuning {
    fn default() -> Self {
        Self {
            slippage_bps: 5_000,
            compute_unit_limit: 400_000,
            compute_unit_price: 5_000_000,
        }
    }
}

pub struct PumpFunBuyer {
    rpc: Arc<RpcClient>,
    wallet: Wallet,
    decoder: CurveDecoder,
    tuning: BuyTuning,
}

impl PumpFunBuyer {
    pub fn new(
        rpc: Arc<RpcClient>,
        wallet: Wallet,
        decoder: CurveDecoder,
        tuning: BuyTuning,
    ) -> Self {
        Self {
            rpc,
            wallet,
            decoder,
            tuning,
        }
    }
}

#[async_trait]
impl BuySubmitter for PumpFunBuyer {
    async fn buy(&self, order: &BuyOrder) -> Result<BuyFill, SubmitError> {
        let data = self
            .rpc
            .get_account_data(&order.bonding_curve)
            .await
            .map_err(|e| SubmitError::Curve(e.to_string()))?;
        let reserves = self
            .decoder
            .read_reserves(&data)
            .map_err(|e| SubmitError::Curve(e.to_string()))?;

        let lamports_in = sol_to_lamports(order.amount_sol);
        let token_amount = reserves.tokens_out(lamports_in);
        if token_amount == 0 {
            return Err(SubmitError::ZeroOutput {
                amount_sol: order.amount_sol,
            });
        }
        let max_cost = max_sol_cost(lamports_in, self.tuning.slippage_bps);

        let payer = self.wallet.pubkey();
        let instructions = vec![
            ComputeBudgetInstruction::set_compute_unit_limit(self.tuning.compute_unit_limit),
            ComputeBudgetInstruction::set_compute_unit_price(self.tuning.compute_unit_price),
            create_ata_idempotent(&payer, &payer, &order.mint),
            buy_instruction(&payer, &order.mint, &order.bonding_curve, token_amount, max_cost),
        ];

        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| SubmitError::Transaction(e.to_string()))?;
        let tx = Transaction::new_signed_with_payer(
            &instructions,
            Some(&payer),
            &[self.wallet.keypair()],
            blockhash,
        );

        info!(
            "Sending buy: {} SOL for ~{} base units of {} (max cost {} lamports)",
            order.amount_sol, token_amount, order.mint, max_cost
        );
        let signature = self
            .rpc
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(|e| SubmitError::Transaction(e.to_string()))?;
        debug!("Buy confirmed: {}", signature);

        Ok(BuyFill {
            signature: signature.to_string(),
            tokens_received: Some(token_amount as f64 / 10f64.powi(TOKEN_DECIMALS as i32)),
        })
    }
}

fn max_sol_cost(lamports_in: u64, slippage_bps: u64) -> u64 {
    let cost = lamports_in as u128 * (10_000 + slippage_bps as u128) / 10_000;
    u64::try_from(cost).unwrap_or(u64::MAX)
}

fn buy_instruction(
    user: &Pubkey,
    mint: &Pubkey,
    bonding_curve: &Pubkey,
    token_amount: u64,
    max_sol_cost: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(24);
    data.extend_from_slice(&BUY_DISCRIMINATOR);
    data.extend_from_slice(&token_amount.to_le_bytes());
    data.extend_from_slice(&max_sol_cost.to_le_bytes());

    Instruction {
        program_id: PUMP_FUN_PROGRAM,
        accounts: vec![
            AccountMeta::new_readonly(PUMP_FUN_GLOBAL, false),
            AccountMeta::new(PUMP_FUN_FEE_RECIPIENT, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*bonding_curve, false),
            AccountMeta::new(associated_token_address(bonding_curve, mint), false),
            AccountMeta::new(associated_token_address(user, mint), false),
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
            AccountMeta::new_readonly(PUMP_FUN_EVENT_AUTHORITY, false),
            AccountMeta::new_readonly(PUMP_FUN_PROGRAM, false),
        ],
        data,
    }
}

fn create_ata_idempotent(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(associated_token_address(owner, mint), false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM, false),
        ],
        data: vec![ATA_CREATE_IDEMPOTENT],
    }
}
