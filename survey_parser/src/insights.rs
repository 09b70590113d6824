//! Summary figures about each leader, computed from the parsed records.

use serde::Serialize;

use crate::config::*;
use crate::round_2dp;

/// A category with its average peer rating.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderInsights {
    pub leader: String,
    /// Mean of the category averages of the peers.
    pub overall_peer_average: Option<f64>,
    pub overall_self_average: Option<f64>,
    /// The category with the best peer average.
    pub top_strength: Option<CategoryScore>,
    /// The category with the lowest peer average.
    pub development_area: Option<CategoryScore>,
    /// Mean distance between the peer and the self scores, over the categories
    /// scored by both.
    pub alignment_gap: Option<f64>,
    /// Number of categories with a perfect peer average.
    pub excellent_categories: usize,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedLeader {
    pub leader: String,
    pub overall_peer_average: f64,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round_2dp(values.iter().sum::<f64>() / values.len() as f64))
    }
}

fn present_scores(scores: &CategoryScores) -> Vec<(&String, f64)> {
    scores
        .iter()
        .filter_map(|(k, v)| v.map(|x| (k, x)))
        .collect()
}

fn to_score(p: Option<(&String, f64)>) -> Option<CategoryScore> {
    p.map(|(k, v)| CategoryScore {
        category: k.clone(),
        score: v,
    })
}

pub fn overall_average(scores: &CategoryScores) -> Option<f64> {
    let values: Vec<f64> = present_scores(scores).iter().map(|(_, v)| *v).collect();
    mean(&values)
}

pub fn leader_insights(record: &LeaderRecord, max_rating: u8) -> LeaderInsights {
    let peer = present_scores(&record.average_scores);

    // Ties go to the first category.
    let mut top: Option<(&String, f64)> = None;
    let mut low: Option<(&String, f64)> = None;
    for (k, v) in peer.iter().copied() {
        if top.map_or(true, |(_, t)| v > t) {
            top = Some((k, v));
        }
        if low.map_or(true, |(_, l)| v < l) {
            low = Some((k, v));
        }
    }
    let diffs: Vec<f64> = record
        .average_scores
        .iter()
        .filter_map(|(k, v)| {
            let s = record.self_assessment.get(k).cloned().flatten();
            match (v, s) {
                (Some(p), Some(s)) => Some((p - s).abs()),
                _ => None,
            }
        })
        .collect();

    LeaderInsights {
        leader: record.leader.clone(),
        overall_peer_average: overall_average(&record.average_scores),
        overall_self_average: overall_average(&record.self_assessment),
        top_strength: to_score(top),
        development_area: to_score(low),
        alignment_gap: mean(&diffs),
        excellent_categories: peer
            .iter()
            .filter(|(_, v)| *v >= max_rating as f64)
            .count(),
    }
}

/// The leaders by decreasing overall peer average. Leaders without any average are
/// left out. Equal averages keep the order of the records.
pub fn rank_leaders(records: &[LeaderRecord], limit: Option<usize>) -> Vec<RankedLeader> {
    let mut res: Vec<RankedLeader> = records
        .iter()
        .filter_map(|r| {
            overall_average(&r.average_scores).map(|avg| RankedLeader {
                leader: r.leader.clone(),
                overall_peer_average: avg,
            })
        })
        .collect();
    res.sort_by(|a, b| b.overall_peer_average.total_cmp(&a.overall_peer_average));
    if let Some(n) = limit {
        res.truncate(n);
    }
    res
}
