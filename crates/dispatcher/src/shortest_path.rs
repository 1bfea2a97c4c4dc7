use std::cmp::Ordering;
use std::collections::BinaryHeap;

use triage_core::models::PathResult;
use triage_core::{TriageError, TriageResult};

use crate::road_graph::RoadGraph;

#[derive(Copy, Clone, PartialEq)]
struct FrontierState {
    cost: f64,
    seq: u64,
    node: usize,
}

impl Eq for FrontierState {}

// BinaryHeap 是最大堆，这里反转比较得到最小堆；代价相同按入堆顺序出堆
impl Ord for FrontierState {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra 单源最短路径
pub struct ShortestPathEngine;

impl ShortestPathEngine {
    /// 计算 `start` 到 `end` 的最短路径
    ///
    /// 起点或终点不在图中时返回 `UnknownNode` 错误；终点不可达时返回
    /// `distance_km = -1` 与空路径，这是正常结果。
    pub fn shortest_path(graph: &RoadGraph, start: &str, end: &str) -> TriageResult<PathResult> {
        let source = graph
            .index_of(start)
            .ok_or_else(|| TriageError::UnknownNode { id: start.to_string() })?;
        let target = graph
            .index_of(end)
            .ok_or_else(|| TriageError::UnknownNode { id: end.to_string() })?;

        let n = graph.node_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut frontier = BinaryHeap::new();
        let mut seq = 0u64;

        dist[source] = 0.0;
        frontier.push(FrontierState {
            cost: 0.0,
            seq,
            node: source,
        });

        while let Some(FrontierState { cost, node, .. }) = frontier.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;

            if node == target {
                break;
            }

            for &(next, weight) in graph.neighbors_by_index(node) {
                if visited[next] {
                    continue;
                }
                let next_cost = cost + weight;
                if next_cost < dist[next] {
                    dist[next] = next_cost;
                    prev[next] = Some(node);
                    seq += 1;
                    frontier.push(FrontierState {
                        cost: next_cost,
                        seq,
                        node: next,
                    });
                }
            }
        }

        if !visited[target] {
            return Ok(PathResult::unreachable());
        }

        let mut path = vec![graph.id_of(target).to_string()];
        let mut current = target;
        while let Some(previous) = prev[current] {
            path.push(graph.id_of(previous).to_string());
            current = previous;
        }
        path.reverse();

        Ok(PathResult {
            distance_km: dist[target],
            path,
        })
    }
}
