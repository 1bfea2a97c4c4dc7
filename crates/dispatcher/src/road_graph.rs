use std::collections::HashMap;

use tracing::debug;

use triage_core::models::GeoNode;
use triage_core::{TriageError, TriageResult};

/// 有向加权路网
///
/// 每次路线计算时重新构建，不做持久化。节点按输入顺序编号，邻接表按编号存储，
/// 遍历顺序对固定输入是确定的。
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl RoadGraph {
    /// 全对扫描构图
    ///
    /// 对每个有序对 (i, j)，若大圆距离小于 `max_radius_km`，添加有向边 i→j，
    /// 权重为 `distance × safety_factor(j)`。权重取决于终点的安全系数，
    /// 因此 A→B 与 B→A 的权重一般不相等。
    pub fn build(nodes: &[GeoNode], max_radius_km: f64) -> TriageResult<Self> {
        let mut graph = Self::default();
        for node in nodes {
            node.validate()?;
            graph.add_node(&node.id)?;
        }

        for (i, from) in nodes.iter().enumerate() {
            let from_point = from.point();
            for (j, to) in nodes.iter().enumerate() {
                if i == j {
                    continue;
                }
                let distance = from_point.haversine_km(&to.point());
                if distance < max_radius_km {
                    graph.adjacency[i].push((j, distance * to.safety_factor));
                }
            }
        }

        debug!(
            "构建路网完成: {} 个节点, {} 条边, 连接半径 {} km",
            graph.node_count(),
            graph.edge_count(),
            max_radius_km
        );

        Ok(graph)
    }

    /// 直接由边列表构图，权重必须为非负有限数
    pub fn from_edges(node_ids: &[&str], edges: &[(&str, &str, f64)]) -> TriageResult<Self> {
        let mut graph = Self::default();
        for id in node_ids {
            graph.add_node(id)?;
        }

        for (from, to, weight) in edges {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(TriageError::invalid_input(format!(
                    "边 {from}->{to} 的权重无效: {weight}"
                )));
            }
            let from_index = graph.require(from)?;
            let to_index = graph.require(to)?;
            graph.adjacency[from_index].push((to_index, *weight));
        }

        Ok(graph)
    }

    fn add_node(&mut self, id: &str) -> TriageResult<()> {
        if self.index.contains_key(id) {
            return Err(TriageError::invalid_input(format!("节点ID重复: {id}")));
        }
        self.index.insert(id.to_string(), self.ids.len());
        self.ids.push(id.to_string());
        self.adjacency.push(Vec::new());
        Ok(())
    }

    fn require(&self, id: &str) -> TriageResult<usize> {
        self.index_of(id).ok_or_else(|| TriageError::UnknownNode { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn id_of(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub(crate) fn neighbors_by_index(&self, index: usize) -> &[(usize, f64)] {
        &self.adjacency[index]
    }

    /// 某节点的出边 (邻居ID, 权重)
    pub fn neighbors(&self, id: &str) -> Vec<(&str, f64)> {
        match self.index_of(id) {
            Some(index) => self.adjacency[index]
                .iter()
                .map(|(to, weight)| (self.ids[*to].as_str(), *weight))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;
        self.adjacency[from_index]
            .iter()
            .find(|(neighbor, _)| *neighbor == to_index)
            .map(|(_, weight)| *weight)
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }
}
