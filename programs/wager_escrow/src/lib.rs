use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

pub mod pda;
pub mod settlement;

declare_id!("CFoPxgBgTTbA62Kfbh4qLpVf2pADhseiqjjx6usDu4Vc");

/// Wager Escrow
/// Token-escrowed yes/no bets addressed by title.
/// Each bet owns an SPL token vault; winners split the full pot
/// proportionally to their stake once the designated resolver fixes
/// the outcome.

#[program]
pub mod wager_escrow {
    use super::*;

    /// Open a new bet and create its empty token vault
    /// title: human-readable proposition, doubles as the lookup key
    /// min_stake: smallest accepted wager, in base units of the mint
    /// deadline: unix timestamp after which staking closes
    pub fn create_bet(
        ctx: Context<CreateBet>,
        title: String,
        min_stake: u64,
        deadline: i64,
    ) -> Result<()> {
        require!(!title.is_empty(), BettingError::TitleEmpty);
        require!(title.len() <= MAX_TITLE_LEN, BettingError::TitleTooLong);
        require!(min_stake > 0, BettingError::InvalidMinStake);

        let clock = Clock::get()?;
        require!(deadline > clock.unix_timestamp, BettingError::DeadlineInPast);

        let bet = &mut ctx.accounts.bet;
        bet.creator = ctx.accounts.creator.key();
        bet.resolver = ctx.accounts.creator.key();
        bet.title = title.clone();
        bet.min_stake = min_stake;
        bet.deadline = deadline;
        bet.created_at = clock.unix_timestamp;
        bet.resolved_at = 0;
        bet.status = BetStatus::Open;
        bet.outcome = false;
        bet.yes_bettors = 0;
        bet.no_bettors = 0;
        bet.total_yes_amount = 0;
        bet.total_no_amount = 0;
        bet.token_mint = ctx.accounts.token_mint.key();
        bet.vault = ctx.accounts.vault_token_account.key();
        bet.bump = ctx.bumps.bet;
        bet.bump_vault_authority = ctx.bumps.vault_authority;
        bet.bump_vault_ta = ctx.bumps.vault_token_account;

        emit!(BetCreated {
            bet: ctx.accounts.bet.key(),
            creator: ctx.accounts.creator.key(),
            title,
            min_stake,
            deadline,
            token_mint: ctx.accounts.token_mint.key(),
            vault: ctx.accounts.vault_token_account.key(),
        });

        Ok(())
    }

    /// Stake tokens on one side of an open bet
    /// side: true for YES, false for NO
    /// Repeat stakes by the same bettor accumulate and must keep the side
    pub fn place_bet(ctx: Context<PlaceBet>, side: bool, amount: u64) -> Result<()> {
        let bet = &ctx.accounts.bet;
        require!(bet.status == BetStatus::Open, BettingError::BetNotOpen);

        let clock = Clock::get()?;
        require!(clock.unix_timestamp < bet.deadline, BettingError::BettingClosed);
        require!(amount >= bet.min_stake, BettingError::StakeTooLow);

        let wager = &ctx.accounts.wager;
        let first_stake = wager.bettor == Pubkey::default();
        if !first_stake {
            require!(wager.side == side, BettingError::CannotChangeSide);
        }

        // Capture keys before mutable borrows
        let bet_key = ctx.accounts.bet.key();
        let bettor_key = ctx.accounts.bettor.key();

        // Ledger validation is complete; move the stake into the vault.
        // The transaction reverts as a whole, so deposit and ledger update
        // are all-or-nothing.
        let cpi_context = CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.bettor_token_account.to_account_info(),
                to: ctx.accounts.vault_token_account.to_account_info(),
                authority: ctx.accounts.bettor.to_account_info(),
            },
        );
        token::transfer(cpi_context, amount)?;

        // Update bet totals
        let bet = &mut ctx.accounts.bet;
        if side {
            bet.total_yes_amount = bet.total_yes_amount.checked_add(amount).unwrap();
            if first_stake {
                bet.yes_bettors += 1;
            }
        } else {
            bet.total_no_amount = bet.total_no_amount.checked_add(amount).unwrap();
            if first_stake {
                bet.no_bettors += 1;
            }
        }
        let total_yes_amount = bet.total_yes_amount;
        let total_no_amount = bet.total_no_amount;

        // Record the bettor's wager
        let wager = &mut ctx.accounts.wager;
        if first_stake {
            wager.bettor = bettor_key;
            wager.bet = bet_key;
            wager.side = side;
            wager.claimed = false;
            wager.bump = ctx.bumps.wager;
        }
        wager.amount = wager.amount.checked_add(amount).unwrap();

        emit!(WagerPlaced {
            bet: bet_key,
            bettor: bettor_key,
            side,
            amount,
            total_stake: wager.amount,
            total_yes_amount,
            total_no_amount,
        });

        Ok(())
    }

    /// Fix the outcome of a bet (designated resolver only)
    /// Allowed only after the deadline; freezes totals for settlement.
    /// No funds move here, winners withdraw via claim_winnings.
    pub fn resolve_bet(ctx: Context<ResolveBet>, outcome: bool) -> Result<()> {
        let bet = &ctx.accounts.bet;
        require!(bet.status == BetStatus::Open, BettingError::BetNotOpen);

        let clock = Clock::get()?;
        require!(
            clock.unix_timestamp >= bet.deadline,
            BettingError::DeadlineNotReached
        );

        let bet_key = ctx.accounts.bet.key();

        let bet = &mut ctx.accounts.bet;
        bet.status = BetStatus::Resolved;
        bet.outcome = outcome;
        bet.resolved_at = clock.unix_timestamp;

        emit!(BetResolved {
            bet: bet_key,
            outcome,
            total_yes_amount: bet.total_yes_amount,
            total_no_amount: bet.total_no_amount,
            resolved_at: bet.resolved_at,
        });

        Ok(())
    }

    /// Cancel an open bet (designated resolver only)
    /// Outstanding stakes stay in the vault and become refundable via
    /// claim_refund.
    pub fn cancel_bet(ctx: Context<CancelBet>) -> Result<()> {
        let bet = &ctx.accounts.bet;
        require!(bet.status == BetStatus::Open, BettingError::BetNotOpen);

        let bet_key = ctx.accounts.bet.key();
        let total_staked = bet
            .total_yes_amount
            .checked_add(bet.total_no_amount)
            .unwrap();

        let bet = &mut ctx.accounts.bet;
        bet.status = BetStatus::Cancelled;

        emit!(BetCancelled {
            bet: bet_key,
            total_staked,
        });

        Ok(())
    }

    /// Withdraw a winning payout from a resolved bet
    /// If nobody staked the resolved side there are no winners; every
    /// staker is refunded their stake instead.
    pub fn claim_winnings(ctx: Context<ClaimWinnings>) -> Result<()> {
        let bet = &ctx.accounts.bet;
        let wager = &ctx.accounts.wager;

        require!(bet.status == BetStatus::Resolved, BettingError::BetNotResolved);
        require!(!wager.claimed, BettingError::AlreadyClaimed);

        let (winning_pool, losing_pool) = if bet.outcome {
            (bet.total_yes_amount, bet.total_no_amount)
        } else {
            (bet.total_no_amount, bet.total_yes_amount)
        };

        let payout = if winning_pool == 0 {
            wager.amount
        } else {
            require!(wager.side == bet.outcome, BettingError::NotAWinner);
            // cannot fail: winning_pool > 0 and both pools are bounded by
            // the mint supply, so the result fits in u64
            settlement::winner_payout(wager.amount, winning_pool, losing_pool).unwrap()
        };

        // Conservation invariant: the vault always covers every unclaimed
        // payout. A shortfall here is corrupted bookkeeping, not a caller
        // mistake.
        require!(
            ctx.accounts.vault_token_account.amount >= payout,
            BettingError::InsufficientVaultBalance
        );

        let bet_key = ctx.accounts.bet.key();
        let stake = wager.amount;
        let vault_bump = bet.bump_vault_authority;

        let vault_seeds = &[b"vault".as_ref(), bet_key.as_ref(), &[vault_bump]];
        let signer = &[&vault_seeds[..]];

        let cpi_context = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.vault_token_account.to_account_info(),
                to: ctx.accounts.bettor_token_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer,
        );
        token::transfer(cpi_context, payout)?;

        let wager = &mut ctx.accounts.wager;
        wager.claimed = true;

        emit!(WinningsClaimed {
            bet: bet_key,
            bettor: ctx.accounts.bettor.key(),
            stake,
            payout,
        });

        Ok(())
    }

    /// Withdraw a stake from a cancelled bet
    pub fn claim_refund(ctx: Context<ClaimRefund>) -> Result<()> {
        let bet = &ctx.accounts.bet;
        let wager = &ctx.accounts.wager;

        require!(
            bet.status == BetStatus::Cancelled,
            BettingError::BetNotCancelled
        );
        require!(!wager.claimed, BettingError::AlreadyClaimed);

        let refund_amount = wager.amount;
        require!(
            ctx.accounts.vault_token_account.amount >= refund_amount,
            BettingError::InsufficientVaultBalance
        );

        let bet_key = ctx.accounts.bet.key();
        let vault_bump = bet.bump_vault_authority;

        let vault_seeds = &[b"vault".as_ref(), bet_key.as_ref(), &[vault_bump]];
        let signer = &[&vault_seeds[..]];

        let cpi_context = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.vault_token_account.to_account_info(),
                to: ctx.accounts.bettor_token_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer,
        );
        token::transfer(cpi_context, refund_amount)?;

        let wager = &mut ctx.accounts.wager;
        wager.claimed = true;

        emit!(RefundClaimed {
            bet: bet_key,
            bettor: ctx.accounts.bettor.key(),
            refund_amount,
        });

        Ok(())
    }

    /// Get a bet's current totals, counts and vault balance
    pub fn get_bet_summary(ctx: Context<GetBetSummary>) -> Result<BetSummary> {
        let bet = &ctx.accounts.bet;
        Ok(BetSummary {
            status: bet.status,
            outcome: bet.outcome,
            min_stake: bet.min_stake,
            deadline: bet.deadline,
            yes_bettors: bet.yes_bettors,
            no_bettors: bet.no_bettors,
            total_yes_amount: bet.total_yes_amount,
            total_no_amount: bet.total_no_amount,
            vault_balance: ctx.accounts.vault_token_account.amount,
        })
    }
}

/// Longest accepted bet title, in bytes
pub const MAX_TITLE_LEN: usize = 100;

// === Account Structures ===

#[derive(Accounts)]
#[instruction(title: String)]
pub struct CreateBet<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    // Title-addressed: init on the derived PDA enforces title uniqueness
    // atomically, a second create with the same title fails at init.
    #[account(
        init,
        payer = creator,
        space = 8 + Bet::INIT_SPACE,
        seeds = [b"bet".as_ref(), pda::title_seed(&title).as_ref()],
        bump,
    )]
    pub bet: Account<'info, Bet>,

    /// CHECK: PDA that signs vault withdrawals
    #[account(
        seeds = [b"vault", bet.key().as_ref()],
        bump,
    )]
    pub vault_authority: AccountInfo<'info>,

    #[account(
        init,
        payer = creator,
        token::mint = token_mint,
        token::authority = vault_authority,
        seeds = [b"vault_token_account", bet.key().as_ref()],
        bump,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_mint: Account<'info, Mint>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct PlaceBet<'info> {
    #[account(mut)]
    pub bettor: Signer<'info>,

    #[account(mut)]
    pub bet: Account<'info, Bet>,

    #[account(
        init_if_needed,
        payer = bettor,
        space = 8 + Wager::INIT_SPACE,
        seeds = [b"wager", bet.key().as_ref(), bettor.key().as_ref()],
        bump,
    )]
    pub wager: Account<'info, Wager>,

    #[account(
        mut,
        constraint = bettor_token_account.mint == bet.token_mint @ BettingError::MintMismatch,
    )]
    pub bettor_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.key() == bet.vault @ BettingError::InvalidVault,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ResolveBet<'info> {
    #[account(
        mut,
        constraint = bet.resolver == resolver.key() @ BettingError::NotResolver,
    )]
    pub bet: Account<'info, Bet>,

    pub resolver: Signer<'info>,
}

#[derive(Accounts)]
pub struct CancelBet<'info> {
    #[account(
        mut,
        constraint = bet.resolver == resolver.key() @ BettingError::NotResolver,
    )]
    pub bet: Account<'info, Bet>,

    pub resolver: Signer<'info>,
}

#[derive(Accounts)]
pub struct ClaimWinnings<'info> {
    #[account(mut)]
    pub bettor: Signer<'info>,

    pub bet: Account<'info, Bet>,

    #[account(
        mut,
        seeds = [b"wager", bet.key().as_ref(), bettor.key().as_ref()],
        bump = wager.bump,
        constraint = wager.bettor == bettor.key() @ BettingError::NotWagerOwner,
    )]
    pub wager: Account<'info, Wager>,

    /// CHECK: PDA that signs vault withdrawals
    #[account(
        seeds = [b"vault", bet.key().as_ref()],
        bump = bet.bump_vault_authority,
    )]
    pub vault_authority: AccountInfo<'info>,

    #[account(
        mut,
        constraint = vault_token_account.key() == bet.vault @ BettingError::InvalidVault,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = bettor_token_account.mint == bet.token_mint @ BettingError::MintMismatch,
    )]
    pub bettor_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct ClaimRefund<'info> {
    #[account(mut)]
    pub bettor: Signer<'info>,

    pub bet: Account<'info, Bet>,

    #[account(
        mut,
        seeds = [b"wager", bet.key().as_ref(), bettor.key().as_ref()],
        bump = wager.bump,
        constraint = wager.bettor == bettor.key() @ BettingError::NotWagerOwner,
    )]
    pub wager: Account<'info, Wager>,

    /// CHECK: PDA that signs vault withdrawals
    #[account(
        seeds = [b"vault", bet.key().as_ref()],
        bump = bet.bump_vault_authority,
    )]
    pub vault_authority: AccountInfo<'info>,

    #[account(
        mut,
        constraint = vault_token_account.key() == bet.vault @ BettingError::InvalidVault,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = bettor_token_account.mint == bet.token_mint @ BettingError::MintMismatch,
    )]
    pub bettor_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct GetBetSummary<'info> {
    pub bet: Account<'info, Bet>,

    #[account(
        constraint = vault_token_account.key() == bet.vault @ BettingError::InvalidVault,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,
}

// === State Accounts ===

#[account]
#[derive(InitSpace)]
pub struct Bet {
    pub creator: Pubkey,
    pub resolver: Pubkey,
    #[max_len(100)]
    pub title: String,
    pub min_stake: u64,
    pub deadline: i64,
    pub created_at: i64,
    pub resolved_at: i64,
    pub status: BetStatus,
    pub outcome: bool,
    pub yes_bettors: u64,
    pub no_bettors: u64,
    pub total_yes_amount: u64,
    pub total_no_amount: u64,
    pub token_mint: Pubkey,
    pub vault: Pubkey,
    pub bump: u8,
    pub bump_vault_authority: u8,
    pub bump_vault_ta: u8,
}

#[account]
#[derive(InitSpace)]
pub struct Wager {
    pub bettor: Pubkey,
    pub bet: Pubkey,
    pub side: bool,
    pub amount: u64,
    pub claimed: bool,
    pub bump: u8,
}

// === Types ===

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace)]
pub enum BetStatus {
    Open,
    Resolved,
    Cancelled,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct BetSummary {
    pub status: BetStatus,
    pub outcome: bool,
    pub min_stake: u64,
    pub deadline: i64,
    pub yes_bettors: u64,
    pub no_bettors: u64,
    pub total_yes_amount: u64,
    pub total_no_amount: u64,
    pub vault_balance: u64,
}

// === Events ===

#[event]
pub struct BetCreated {
    pub bet: Pubkey,
    pub creator: Pubkey,
    pub title: String,
    pub min_stake: u64,
    pub deadline: i64,
    pub token_mint: Pubkey,
    pub vault: Pubkey,
}

#[event]
pub struct WagerPlaced {
    pub bet: Pubkey,
    pub bettor: Pubkey,
    pub side: bool,
    pub amount: u64,
    pub total_stake: u64,
    pub total_yes_amount: u64,
    pub total_no_amount: u64,
}

#[event]
pub struct BetResolved {
    pub bet: Pubkey,
    pub outcome: bool,
    pub total_yes_amount: u64,
    pub total_no_amount: u64,
    pub resolved_at: i64,
}

#[event]
pub struct BetCancelled {
    pub bet: Pubkey,
    pub total_staked: u64,
}

#[event]
pub struct WinningsClaimed {
    pub bet: Pubkey,
    pub bettor: Pubkey,
    pub stake: u64,
    pub payout: u64,
}

#[event]
pub struct RefundClaimed {
    pub bet: Pubkey,
    pub bettor: Pubkey,
    pub refund_amount: u64,
}

// === Errors ===

#[error_code]
pub enum BettingError {
    #[msg("Title cannot be empty")]
    TitleEmpty,
    #[msg("Title too long (max 100 bytes)")]
    TitleTooLong,
    #[msg("Minimum stake must be greater than zero")]
    InvalidMinStake,
    #[msg("Deadline must be in the future")]
    DeadlineInPast,
    #[msg("Bet is not open")]
    BetNotOpen,
    #[msg("Betting deadline has passed")]
    BettingClosed,
    #[msg("Stake is below the bet's minimum")]
    StakeTooLow,
    #[msg("Cannot resolve before the deadline")]
    DeadlineNotReached,
    #[msg("Only the designated resolver can do this")]
    NotResolver,
    #[msg("Cannot switch sides on an existing wager")]
    CannotChangeSide,
    #[msg("Bet has not been resolved")]
    BetNotResolved,
    #[msg("Bet was not cancelled")]
    BetNotCancelled,
    #[msg("Wager did not win this bet")]
    NotAWinner,
    #[msg("Winnings already claimed")]
    AlreadyClaimed,
    #[msg("Not the wager owner")]
    NotWagerOwner,
    #[msg("Invalid vault token account")]
    InvalidVault,
    #[msg("Token account mint does not match the bet's token")]
    MintMismatch,
    #[msg("Vault cannot cover the computed payout")]
    InsufficientVaultBalance,
}
