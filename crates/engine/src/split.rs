//! Split policy.
//!
//! Validates a split specification against an expense total and derives the
//! amount every member owes. The functions here are pure: they never touch
//! the store.
//!
//! Amounts are integer cents. Derived amounts always add up to the expense
//! total exactly: whenever a division leaves a remainder, the spare cents go
//! to the members with the largest fractional part (ties resolved by member
//! order).

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Unequal,
    Percentage,
    Share,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Unequal => "unequal",
            Self::Percentage => "percentage",
            Self::Share => "share",
        }
    }
}

impl TryFrom<&str> for SplitType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "unequal" => Ok(Self::Unequal),
            "percentage" => Ok(Self::Percentage),
            "share" => Ok(Self::Share),
            other => Err(EngineError::InvalidSplit(format!(
                "invalid split type: {other}"
            ))),
        }
    }
}

/// A percentage with two decimals, stored as basis points (`100% = 10_000`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Percentage(u32);

impl Percentage {
    pub const HUNDRED: Percentage = Percentage(10_000);

    #[must_use]
    pub const fn from_basis_points(basis_points: u32) -> Self {
        Self(basis_points)
    }

    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// Converts a decimal percentage (e.g. `33.33`) into basis points.
    pub fn from_decimal(value: f64) -> ResultEngine<Self> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(EngineError::InvalidSplit(
                "percentage must be within [0, 100]".to_string(),
            ));
        }
        let scaled = value * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(EngineError::InvalidSplit(
                "percentage allows at most two decimals".to_string(),
            ));
        }
        Ok(Self(rounded as u32))
    }

    #[must_use]
    pub fn to_decimal(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// A split member as supplied by the caller.
///
/// Which optional field is required depends on the [`SplitType`]:
/// `amount_owed` for unequal splits (optional for equal ones), `percentage`
/// for percentage splits and `share` for share splits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitMemberInput {
    pub user_id: String,
    pub amount_owed: Option<MoneyCents>,
    pub share: Option<u32>,
    pub percentage: Option<Percentage>,
}

impl SplitMemberInput {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            amount_owed: None,
            share: None,
            percentage: None,
        }
    }

    #[must_use]
    pub fn amount_owed(mut self, amount: MoneyCents) -> Self {
        self.amount_owed = Some(amount);
        self
    }

    #[must_use]
    pub fn share(mut self, share: u32) -> Self {
        self.share = Some(share);
        self
    }

    #[must_use]
    pub fn percentage(mut self, percentage: Percentage) -> Self {
        self.percentage = Some(percentage);
        self
    }
}

/// A normalized split member: what a participant owes on an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitMember {
    pub user_id: String,
    pub amount_owed: MoneyCents,
    pub share: Option<u32>,
    pub percentage: Option<Percentage>,
    pub is_equal_share: bool,
}

/// Validates `members` against `total` and returns the normalized members.
pub fn validate_split(
    split_type: SplitType,
    total: MoneyCents,
    members: &[SplitMemberInput],
) -> ResultEngine<Vec<SplitMember>> {
    if !total.is_positive() {
        return Err(EngineError::InvalidAmount(
            "expense amount must be > 0".to_string(),
        ));
    }
    if members.is_empty() {
        return Err(EngineError::InvalidSplit(
            "split must have at least one member".to_string(),
        ));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        let user_id = member.user_id.trim();
        if user_id.is_empty() {
            return Err(EngineError::InvalidSplit(format!(
                "member at index {index} must have a user id"
            )));
        }
        if !seen.insert(user_id) {
            return Err(EngineError::InvalidSplit(format!(
                "member at index {index} duplicates user {user_id}"
            )));
        }
    }

    match split_type {
        SplitType::Equal => equal_split(total, members),
        SplitType::Unequal => unequal_split(total, members),
        SplitType::Percentage => percentage_split(total, members),
        SplitType::Share => share_split(total, members),
    }
}

fn equal_split(total: MoneyCents, members: &[SplitMemberInput]) -> ResultEngine<Vec<SplitMember>> {
    let count = members.len() as i128;
    let weights = vec![1u64; members.len()];
    let derived = allocate_proportionally(total, &weights);

    for (index, member) in members.iter().enumerate() {
        let Some(supplied) = member.amount_owed else {
            continue;
        };
        if supplied.is_negative() {
            return Err(EngineError::InvalidSplit(format!(
                "member at index {index} owes a negative amount"
            )));
        }
        // |supplied - T/N| <= 1 cent, compared without dividing.
        let deviation = (i128::from(supplied.cents()) * count - i128::from(total.cents())).abs();
        if deviation > i128::from(MoneyCents::TOLERANCE.cents()) * count {
            return Err(EngineError::InvalidSplit(format!(
                "member at index {index} owes {supplied}, which deviates from the equal share of {total} / {count}"
            )));
        }
    }

    Ok(members
        .iter()
        .zip(derived)
        .map(|(member, amount_owed)| SplitMember {
            user_id: member.user_id.trim().to_string(),
            amount_owed,
            share: None,
            percentage: None,
            is_equal_share: true,
        })
        .collect())
}

fn unequal_split(
    total: MoneyCents,
    members: &[SplitMemberInput],
) -> ResultEngine<Vec<SplitMember>> {
    let mut out = Vec::with_capacity(members.len());
    let mut sum = MoneyCents::ZERO;
    for (index, member) in members.iter().enumerate() {
        let amount_owed = member.amount_owed.ok_or_else(|| {
            EngineError::InvalidSplit(format!(
                "member at index {index} must supply an owed amount"
            ))
        })?;
        if amount_owed.is_negative() {
            return Err(EngineError::InvalidSplit(format!(
                "member at index {index} owes a negative amount"
            )));
        }
        sum = sum.checked_add(amount_owed).ok_or_else(|| {
            EngineError::InvalidSplit("owed amounts overflow".to_string())
        })?;
        out.push(SplitMember {
            user_id: member.user_id.trim().to_string(),
            amount_owed,
            share: None,
            percentage: None,
            is_equal_share: false,
        });
    }

    if sum.abs_diff(total) > MoneyCents::TOLERANCE {
        return Err(EngineError::InvalidSplit(format!(
            "owed amounts sum to {sum}, expected {total}"
        )));
    }
    Ok(out)
}

fn percentage_split(
    total: MoneyCents,
    members: &[SplitMemberInput],
) -> ResultEngine<Vec<SplitMember>> {
    let mut percentages = Vec::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        let percentage = member.percentage.ok_or_else(|| {
            EngineError::InvalidSplit(format!(
                "member at index {index} must supply a percentage"
            ))
        })?;
        if percentage > Percentage::HUNDRED {
            return Err(EngineError::InvalidSplit(format!(
                "member at index {index} has percentage {percentage} above 100%"
            )));
        }
        percentages.push(percentage);
    }

    let sum: u64 = percentages.iter().map(|p| u64::from(p.basis_points())).sum();
    // Tolerance is 0.01 percentage points, i.e. one basis point.
    if sum.abs_diff(u64::from(Percentage::HUNDRED.basis_points())) > 1 {
        return Err(EngineError::InvalidSplit(format!(
            "percentages sum to {}, expected 100.00%",
            Percentage::from_basis_points(sum.min(u64::from(u32::MAX)) as u32)
        )));
    }

    let weights: Vec<u64> = percentages
        .iter()
        .map(|p| u64::from(p.basis_points()))
        .collect();
    let derived = allocate_proportionally(total, &weights);

    Ok(members
        .iter()
        .zip(percentages)
        .zip(derived)
        .map(|((member, percentage), amount_owed)| SplitMember {
            user_id: member.user_id.trim().to_string(),
            amount_owed,
            share: None,
            percentage: Some(percentage),
            is_equal_share: false,
        })
        .collect())
}

fn share_split(total: MoneyCents, members: &[SplitMemberInput]) -> ResultEngine<Vec<SplitMember>> {
    let mut shares = Vec::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        match member.share {
            Some(share) if share > 0 => shares.push(share),
            Some(_) => {
                return Err(EngineError::InvalidSplit(format!(
                    "member at index {index} must have a positive share"
                )));
            }
            None => {
                return Err(EngineError::InvalidSplit(format!(
                    "member at index {index} must supply a share"
                )));
            }
        }
    }

    let weights: Vec<u64> = shares.iter().map(|s| u64::from(*s)).collect();
    let derived = allocate_proportionally(total, &weights);

    Ok(members
        .iter()
        .zip(shares)
        .zip(derived)
        .map(|((member, share), amount_owed)| SplitMember {
            user_id: member.user_id.trim().to_string(),
            amount_owed,
            share: Some(share),
            percentage: None,
            is_equal_share: false,
        })
        .collect())
}

/// Splits `total` proportionally to `weights` using the largest remainder
/// method. The result always sums to `total`.
///
/// Callers guarantee `weights` is non-empty with a positive sum.
pub(crate) fn allocate_proportionally(total: MoneyCents, weights: &[u64]) -> Vec<MoneyCents> {
    let weight_sum: i128 = weights.iter().map(|w| i128::from(*w)).sum();
    if weights.is_empty() || weight_sum == 0 {
        return vec![MoneyCents::ZERO; weights.len()];
    }
    let total_cents = i128::from(total.cents());

    let mut amounts: Vec<i128> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(i128, usize)> = Vec::with_capacity(weights.len());
    for (index, weight) in weights.iter().enumerate() {
        let numerator = total_cents * i128::from(*weight);
        amounts.push(numerator / weight_sum);
        remainders.push((numerator % weight_sum, index));
    }

    let allocated: i128 = amounts.iter().sum();
    let spare = (total_cents - allocated) as usize;
    // Largest remainder first; on ties the earlier member wins.
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, index) in remainders.into_iter().take(spare) {
        amounts[index] += 1;
    }

    amounts
        .into_iter()
        .map(|cents| MoneyCents::new(cents as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(values: &[i64]) -> Vec<MoneyCents> {
        values.iter().map(|v| MoneyCents::new(*v)).collect()
    }

    fn owed(members: &[SplitMember]) -> Vec<MoneyCents> {
        members.iter().map(|m| m.amount_owed).collect()
    }

    #[test]
    fn equal_split_divides_evenly() {
        let members = ["a", "b", "c"].map(SplitMemberInput::new);
        let split = validate_split(SplitType::Equal, MoneyCents::new(30000), &members).unwrap();
        assert_eq!(owed(&split), cents(&[10000, 10000, 10000]));
        assert!(split.iter().all(|m| m.is_equal_share));
    }

    #[test]
    fn equal_split_spreads_remainder_cents() {
        let members = ["a", "b", "c"].map(SplitMemberInput::new);
        let split = validate_split(SplitType::Equal, MoneyCents::new(10000), &members).unwrap();
        assert_eq!(owed(&split), cents(&[3334, 3333, 3333]));
        assert_eq!(
            split.iter().map(|m| m.amount_owed).sum::<MoneyCents>(),
            MoneyCents::new(10000)
        );
    }

    #[test]
    fn equal_split_accepts_supplied_amounts_within_a_cent() {
        let members = [
            SplitMemberInput::new("a").amount_owed(MoneyCents::new(3333)),
            SplitMemberInput::new("b").amount_owed(MoneyCents::new(3333)),
            SplitMemberInput::new("c").amount_owed(MoneyCents::new(3334)),
        ];
        let split = validate_split(SplitType::Equal, MoneyCents::new(10000), &members).unwrap();
        assert_eq!(
            split.iter().map(|m| m.amount_owed).sum::<MoneyCents>(),
            MoneyCents::new(10000)
        );
    }

    #[test]
    fn equal_split_rejects_deviating_amount() {
        let members = [
            SplitMemberInput::new("a").amount_owed(MoneyCents::new(5000)),
            SplitMemberInput::new("b"),
        ];
        let err = validate_split(SplitType::Equal, MoneyCents::new(9000), &members).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSplit(msg) if msg.contains("index 0")));
    }

    #[test]
    fn unequal_split_requires_matching_sum() {
        let members = [
            SplitMemberInput::new("a").amount_owed(MoneyCents::new(2000)),
            SplitMemberInput::new("b").amount_owed(MoneyCents::new(7000)),
        ];
        assert!(validate_split(SplitType::Unequal, MoneyCents::new(9000), &members).is_ok());
        assert!(matches!(
            validate_split(SplitType::Unequal, MoneyCents::new(9500), &members),
            Err(EngineError::InvalidSplit(_))
        ));
    }

    #[test]
    fn unequal_split_requires_amount_per_member() {
        let members = [
            SplitMemberInput::new("a").amount_owed(MoneyCents::new(2000)),
            SplitMemberInput::new("b"),
        ];
        let err = validate_split(SplitType::Unequal, MoneyCents::new(2000), &members).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSplit(msg) if msg.contains("index 1")));
    }

    #[test]
    fn unequal_split_rejects_negative_amount() {
        let members = [
            SplitMemberInput::new("a").amount_owed(MoneyCents::new(-100)),
            SplitMemberInput::new("b").amount_owed(MoneyCents::new(1100)),
        ];
        assert!(validate_split(SplitType::Unequal, MoneyCents::new(1000), &members).is_err());
    }

    #[test]
    fn percentage_split_derives_amounts() {
        let members = [
            SplitMemberInput::new("a").percentage(Percentage::from_basis_points(5000)),
            SplitMemberInput::new("b").percentage(Percentage::from_basis_points(2500)),
            SplitMemberInput::new("c").percentage(Percentage::from_basis_points(2500)),
        ];
        let split =
            validate_split(SplitType::Percentage, MoneyCents::new(20000), &members).unwrap();
        assert_eq!(owed(&split), cents(&[10000, 5000, 5000]));
        assert_eq!(split[0].percentage, Some(Percentage::from_basis_points(5000)));
    }

    #[test]
    fn percentage_split_tolerates_rounded_thirds() {
        let third = Percentage::from_decimal(33.33).unwrap();
        let members = ["a", "b", "c"].map(|u| SplitMemberInput::new(u).percentage(third));
        let split =
            validate_split(SplitType::Percentage, MoneyCents::new(10000), &members).unwrap();
        assert_eq!(
            split.iter().map(|m| m.amount_owed).sum::<MoneyCents>(),
            MoneyCents::new(10000)
        );
    }

    #[test]
    fn percentage_split_rejects_sum_other_than_hundred() {
        let members = [
            SplitMemberInput::new("a").percentage(Percentage::from_basis_points(5000)),
            SplitMemberInput::new("b").percentage(Percentage::from_basis_points(4000)),
        ];
        let err =
            validate_split(SplitType::Percentage, MoneyCents::new(10000), &members).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSplit(msg) if msg.contains("90.00%")));
    }

    #[test]
    fn share_split_is_proportional() {
        let members = [
            SplitMemberInput::new("a").share(1),
            SplitMemberInput::new("b").share(2),
        ];
        let split = validate_split(SplitType::Share, MoneyCents::new(9000), &members).unwrap();
        assert_eq!(owed(&split), cents(&[3000, 6000]));
        assert_eq!(split[1].share, Some(2));
    }

    #[test]
    fn share_split_rejects_zero_share() {
        let members = [
            SplitMemberInput::new("a").share(0),
            SplitMemberInput::new("b").share(2),
        ];
        assert!(matches!(
            validate_split(SplitType::Share, MoneyCents::new(9000), &members),
            Err(EngineError::InvalidSplit(msg)) if msg.contains("index 0")
        ));
    }

    #[test]
    fn rejects_duplicate_members_and_empty_split() {
        let members = ["a", "a"].map(SplitMemberInput::new);
        assert!(validate_split(SplitType::Equal, MoneyCents::new(100), &members).is_err());
        assert!(validate_split(SplitType::Equal, MoneyCents::new(100), &[]).is_err());
    }

    #[test]
    fn rejects_non_positive_total() {
        let members = ["a"].map(SplitMemberInput::new);
        assert!(matches!(
            validate_split(SplitType::Equal, MoneyCents::ZERO, &members),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn allocation_always_sums_to_total() {
        for total in [1, 7, 100, 9999, 123_457] {
            let weights = [3, 5, 7, 11];
            let allocated = allocate_proportionally(MoneyCents::new(total), &weights);
            assert_eq!(allocated.iter().sum::<MoneyCents>(), MoneyCents::new(total));
        }
    }

    #[test]
    fn percentage_display_and_parse() {
        assert_eq!(Percentage::from_decimal(12.5).unwrap().to_string(), "12.50%");
        assert!(Percentage::from_decimal(100.01).is_err());
        assert!(Percentage::from_decimal(10.125).is_err());
    }
}
