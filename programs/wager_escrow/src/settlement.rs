//! Proportional-pool settlement arithmetic.
//!
//! Winners split the entire pot (both sides' stakes) pro rata to their own
//! stake relative to the winning side's pool. Intermediates widen to u128 so
//! u64-scale pools cannot overflow mid-computation; integer division floors,
//! so the sum of all payouts never exceeds the pot.

/// Payout for a winning stake under the proportional-pool policy:
/// `stake * (winning_pool + losing_pool) / winning_pool`.
///
/// Returns `None` when the winning pool is empty (there are no winners to
/// pay; the claim path refunds stakes instead) or when the result does not
/// fit in a u64.
pub fn winner_payout(stake: u64, winning_pool: u64, losing_pool: u64) -> Option<u64> {
    let pot = (winning_pool as u128).checked_add(losing_pool as u128)?;
    let gross = (stake as u128)
        .checked_mul(pot)?
        .checked_div(winning_pool as u128)?;
    u64::try_from(gross).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pays_proportional_share_of_the_pot() {
        // 10_000 of the 100_000 yes pool wins against 50_000 on no
        assert_eq!(winner_payout(10_000, 100_000, 50_000), Some(15_000));
    }

    #[test]
    fn sole_winner_takes_the_whole_pot() {
        assert_eq!(winner_payout(4_000, 4_000, 9_000), Some(13_000));
    }

    #[test]
    fn no_losing_stakes_returns_the_stake() {
        assert_eq!(winner_payout(7_500, 30_000, 0), Some(7_500));
    }

    #[test]
    fn fractional_shares_floor() {
        // 1 * 4 / 3 = 1.33.. floors to 1
        assert_eq!(winner_payout(1, 3, 1), Some(1));
    }

    #[test]
    fn empty_winning_pool_has_no_payout() {
        assert_eq!(winner_payout(5_000, 0, 5_000), None);
    }

    #[test]
    fn payouts_never_exceed_the_pot() {
        let stakes = [7u64, 13, 29, 51];
        let winning_pool: u64 = stakes.iter().sum();
        let losing_pool = 37u64;
        let paid: u64 = stakes
            .iter()
            .map(|s| winner_payout(*s, winning_pool, losing_pool).unwrap())
            .sum();
        assert!(paid <= winning_pool + losing_pool);
        // flooring leaves at most one unit of dust per winner
        assert!(winning_pool + losing_pool - paid < stakes.len() as u64);
    }

    #[test]
    fn u64_scale_pools_do_not_overflow() {
        let half = u64::MAX / 2;
        assert_eq!(winner_payout(half, half, half), Some(half * 2));
    }

    #[test]
    fn results_past_u64_are_rejected() {
        // stake larger than the winning pool cannot happen under correct
        // bookkeeping; the function still refuses to truncate
        assert_eq!(winner_payout(u64::MAX, 1, u64::MAX), None);
    }
}
