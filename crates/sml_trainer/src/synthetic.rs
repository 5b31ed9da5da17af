//! Synthetic dispute cases for demos and smoke tests
//!
//! Verdicts follow the evidence-quality gap: a gap over 30 points decides
//! for the stronger side, near-ties (under 10) resolve as split or partial,
//! and everything in between is a coin toss between win, loss and split.

use dispute_sml_core::{CaseRecord, DisputeCategory, Verdict};
use rand::seq::SliceRandom;
use rand::Rng;

/// Evidence gap above which the stronger side wins outright
pub const DECISIVE_GAP: i32 = 30;

/// Evidence gap below which the case is a near-tie
pub const NEAR_TIE_GAP: i32 = 10;

/// Jurors per synthetic case
pub const JURY_SIZE: usize = 10;

const NEAR_TIE_VERDICTS: [Verdict; 3] = [Verdict::Split, Verdict::PartialA, Verdict::PartialB];
const CONTESTED_VERDICTS: [Verdict; 3] = [Verdict::PartyAWins, Verdict::PartyBWins, Verdict::Split];

/// Verdict implied by a pair of evidence scores
pub fn verdict_for_evidence<R: Rng + ?Sized>(evidence_a: u8, evidence_b: u8, rng: &mut R) -> Verdict {
    let gap = evidence_a as i32 - evidence_b as i32;
    if gap > DECISIVE_GAP {
        return Verdict::PartyAWins;
    }
    if -gap > DECISIVE_GAP {
        return Verdict::PartyBWins;
    }

    let pool = if gap.abs() < NEAR_TIE_GAP {
        &NEAR_TIE_VERDICTS
    } else {
        &CONTESTED_VERDICTS
    };
    *pool.choose(rng).unwrap_or(&Verdict::Split)
}

/// One synthetic resolved case
pub fn synthetic_case<R: Rng + ?Sized>(case_id: String, rng: &mut R) -> CaseRecord {
    let evidence_quality_a = rng.gen_range(20..100);
    let evidence_quality_b = rng.gen_range(20..100);
    let verdict = verdict_for_evidence(evidence_quality_a, evidence_quality_b, rng);

    let dispute_category = DisputeCategory::ALL
        .choose(rng)
        .copied()
        .unwrap_or_default();

    CaseRecord {
        case_id,
        job_category: rng.gen_range(0..20),
        dispute_category,
        amount_tier: rng.gen_range(0..5),
        evidence_quality_a,
        evidence_quality_b,
        response_time_a: rng.gen_range(1..72),
        response_time_b: rng.gen_range(1..72),
        prior_disputes_a: rng.gen_range(0..5),
        prior_disputes_b: rng.gen_range(0..5),
        votes: (0..JURY_SIZE).map(|_| rng.gen_bool(0.5)).collect(),
        confidences: (0..JURY_SIZE).map(|_| rng.gen_range(50..100)).collect(),
        final_verdict: verdict.code(),
        auto_resolved: rng.gen_bool(0.7),
        consensus_strength: rng.gen_range(60..100),
    }
}

/// `count` synthetic cases with ids `case_0 .. case_{count-1}`
pub fn generate_cases<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<CaseRecord> {
    (0..count)
        .map(|i| synthetic_case(format!("case_{}", i), rng))
        .collect()
}
