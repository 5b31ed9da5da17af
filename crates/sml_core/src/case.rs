//! Dispute case records and the ledger's categorical encodings
//!
//! Category and verdict codes match the ledger's account layout, so a
//! record read off-chain can be fed to the model without translation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of verdict outcomes the classifier distinguishes
pub const NUM_VERDICTS: usize = 6;

/// Highest amount tier (enterprise)
pub const MAX_AMOUNT_TIER: u8 = 4;

/// Upper bound of an evidence quality score
pub const MAX_EVIDENCE_QUALITY: u8 = 100;

/// Classification of the disagreement between the two parties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum DisputeCategory {
    NonDelivery = 0,
    QualityIssue = 1,
    NotAsDescribed = 2,
    LateDelivery = 3,
    CommunicationIssue = 4,
    MaliciousContent = 5,
    PaymentDispute = 6,
    Other = 7,
}

impl DisputeCategory {
    /// Highest category code, used to scale the categorical feature
    pub const MAX_CODE: u8 = 7;

    pub const ALL: [DisputeCategory; 8] = [
        Self::NonDelivery,
        Self::QualityIssue,
        Self::NotAsDescribed,
        Self::LateDelivery,
        Self::CommunicationIssue,
        Self::MaliciousContent,
        Self::PaymentDispute,
        Self::Other,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Symbolic name as used by the ledger tooling
    pub fn name(self) -> &'static str {
        match self {
            Self::NonDelivery => "NON_DELIVERY",
            Self::QualityIssue => "QUALITY_ISSUE",
            Self::NotAsDescribed => "NOT_AS_DESCRIBED",
            Self::LateDelivery => "LATE_DELIVERY",
            Self::CommunicationIssue => "COMMUNICATION_ISSUE",
            Self::MaliciousContent => "MALICIOUS_CONTENT",
            Self::PaymentDispute => "PAYMENT_DISPUTE",
            Self::Other => "OTHER",
        }
    }
}

impl Default for DisputeCategory {
    fn default() -> Self {
        Self::NonDelivery
    }
}

impl TryFrom<u8> for DisputeCategory {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| format!("invalid dispute category code: {}", code))
    }
}

impl From<DisputeCategory> for u8 {
    fn from(category: DisputeCategory) -> Self {
        category.code()
    }
}

impl fmt::Display for DisputeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Jury verdict outcome; the class label predicted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Verdict {
    Pending = 0,
    PartyAWins = 1,
    PartyBWins = 2,
    Split = 3,
    PartialA = 4,
    PartialB = 5,
}

impl Verdict {
    pub const ALL: [Verdict; NUM_VERDICTS] = [
        Self::Pending,
        Self::PartyAWins,
        Self::PartyBWins,
        Self::Split,
        Self::PartialA,
        Self::PartialB,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Class index used by the ensemble
    pub fn class_index(self) -> usize {
        self as usize
    }

    /// Verdict for a class index produced by the ensemble
    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Symbolic name as used by the ledger tooling
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::PartyAWins => "PARTY_A_WINS",
            Self::PartyBWins => "PARTY_B_WINS",
            Self::Split => "SPLIT",
            Self::PartialA => "PARTIAL_A",
            Self::PartialB => "PARTIAL_B",
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::Pending
    }
}

impl TryFrom<u8> for Verdict {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_class_index(code as usize).ok_or_else(|| format!("invalid verdict code: {}", code))
    }
}

impl From<Verdict> for u8 {
    fn from(verdict: Verdict) -> Self {
        verdict.code()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One historical or pending dispute.
///
/// Mirrors the ledger's training record. Jury votes, confidences, the
/// auto-resolution flag and consensus strength are kept for audit only and
/// never reach the feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    pub job_category: u16,
    pub dispute_category: DisputeCategory,
    /// 0 = micro ..= `MAX_AMOUNT_TIER` = enterprise
    pub amount_tier: u8,
    /// 0 ..= `MAX_EVIDENCE_QUALITY`
    pub evidence_quality_a: u8,
    /// 0 ..= `MAX_EVIDENCE_QUALITY`
    pub evidence_quality_b: u8,
    /// Hours
    pub response_time_a: u32,
    /// Hours
    pub response_time_b: u32,
    pub prior_disputes_a: u32,
    pub prior_disputes_b: u32,
    /// One vote per juror, `true` favours party A
    #[serde(default)]
    pub votes: Vec<bool>,
    /// Juror confidence scores (0-100), parallel to `votes`
    #[serde(default)]
    pub confidences: Vec<u8>,
    /// Raw ledger verdict code; codes outside the verdict range are dropped at training time
    #[serde(default)]
    pub final_verdict: u8,
    #[serde(default)]
    pub auto_resolved: bool,
    /// 0-100
    #[serde(default)]
    pub consensus_strength: u8,
}

impl CaseRecord {
    /// A pending case with neutral defaults for every feature input
    pub fn pending(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            job_category: 0,
            dispute_category: DisputeCategory::NonDelivery,
            amount_tier: 0,
            evidence_quality_a: 50,
            evidence_quality_b: 50,
            response_time_a: 24,
            response_time_b: 24,
            prior_disputes_a: 0,
            prior_disputes_b: 0,
            votes: Vec::new(),
            confidences: Vec::new(),
            final_verdict: Verdict::Pending.code(),
            auto_resolved: false,
            consensus_strength: 0,
        }
    }

    /// Training label, if the recorded verdict code is a valid class
    pub fn label(&self) -> Option<usize> {
        self.verdict().map(Verdict::class_index)
    }

    pub fn verdict(&self) -> Option<Verdict> {
        Verdict::try_from(self.final_verdict).ok()
    }
}
