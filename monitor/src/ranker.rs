// Standard library imports
use std::cmp::Ordering;

// Internal imports
use pnode_common::NodeRecord;

/// So sánh theo stake giảm dần, sau đó điểm uy tín giảm dần
fn rank_order(a: &NodeRecord, b: &NodeRecord) -> Ordering {
    b.stake_or_zero()
        .total_cmp(&a.stake_or_zero())
        .then_with(|| b.reputation_score.cmp(&a.reputation_score))
}

/// Sắp xếp và gán thứ hạng liên tục bắt đầu từ 1.
///
/// Sắp xếp ổn định: các node bằng nhau giữ thứ tự đầu vào. Không sửa đầu vào.
pub fn rank_nodes(nodes: &[NodeRecord]) -> Vec<NodeRecord> {
    let mut ranked = nodes.to_vec();
    ranked.sort_by(rank_order);
    assign_sequential_ranks(&mut ranked);
    ranked
}

/// Gán thứ hạng theo thứ tự hiện tại
pub fn assign_sequential_ranks(nodes: &mut [NodeRecord]) {
    for (idx, node) in nodes.iter_mut().enumerate() {
        node.rank = idx + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pnode_common::NodeStatus;
    use proptest::prelude::*;

    fn node(identity: &str, stake: Option<f64>, reputation: u32) -> NodeRecord {
        NodeRecord {
            identity: identity.to_string(),
            display_name: None,
            network_address: "Unknown".to_string(),
            status: NodeStatus::Gossip,
            uptime_ratio: 0.0,
            region: "Global".to_string(),
            country_code: "UN".to_string(),
            software_version: "Unknown".to_string(),
            last_observed_at: Utc::now(),
            reputation_score: reputation,
            stake_amount: stake,
            rewards_24h: None,
            rank: 0,
        }
    }

    #[test]
    fn test_rank_order() {
        let input = vec![
            node("low", Some(1.0), 100),
            node("tie-low-rep", Some(5.0), 60),
            node("none", None, 90),
            node("tie-high-rep", Some(5.0), 100),
        ];
        let ranked = rank_nodes(&input);
        let ids: Vec<&str> = ranked.iter().map(|n| n.identity.as_str()).collect();
        assert_eq!(ids, vec!["tie-high-rep", "tie-low-rep", "low", "none"]);
        assert_eq!(ranked.iter().map(|n| n.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        // Đầu vào không bị thay đổi
        assert!(input.iter().all(|n| n.rank == 0));
        assert_eq!(input[0].identity, "low");
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let input = vec![node("x", Some(2.0), 50), node("y", Some(2.0), 50), node("z", Some(2.0), 50)];
        let ranked = rank_nodes(&input);
        let ids: Vec<&str> = ranked.iter().map(|n| n.identity.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_nodes(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_ranks_are_dense(entries in prop::collection::vec((0u32..1000, 20u32..=100), 0..60)) {
            let input: Vec<NodeRecord> = entries
                .iter()
                .enumerate()
                .map(|(i, (stake, rep))| node(&i.to_string(), Some(*stake as f64), *rep))
                .collect();
            let ranked = rank_nodes(&input);

            let mut ranks: Vec<usize> = ranked.iter().map(|n| n.rank).collect();
            ranks.sort_unstable();
            prop_assert_eq!(ranks, (1..=input.len()).collect::<Vec<_>>());
        }

        #[test]
        fn prop_sorted_by_stake_then_reputation(entries in prop::collection::vec((0u32..50, 20u32..=100), 0..60)) {
            let input: Vec<NodeRecord> = entries
                .iter()
                .enumerate()
                .map(|(i, (stake, rep))| node(&i.to_string(), Some(*stake as f64), *rep))
                .collect();
            let ranked = rank_nodes(&input);

            for pair in ranked.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.stake_or_zero() >= b.stake_or_zero());
                if a.stake_or_zero() == b.stake_or_zero() {
                    prop_assert!(a.reputation_score >= b.reputation_score);
                }
            }
        }
    }
}
