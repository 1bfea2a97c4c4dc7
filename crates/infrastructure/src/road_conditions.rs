use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use triage_core::config::WaypointConfig;
use triage_core::models::{validate_safety_factor, GeoNode};
use triage_core::{TriageError, TriageResult};
use triage_domain::RoadConditionsStore;

#[derive(Debug)]
struct WaypointSlot {
    id: String,
    lat: f64,
    lng: f64,
    /// `f64` 的位模式
    factor_bits: AtomicU64,
}

impl WaypointSlot {
    fn factor(&self) -> f64 {
        f64::from_bits(self.factor_bits.load(Ordering::Acquire))
    }
}

/// 内存路况存储
///
/// 途经点集合在构造后固定，只有安全系数可变。每个系数存放在独立的原子变量里，
/// 单个更新不加表锁，读者看到的要么是旧值要么是新值。
#[derive(Debug)]
pub struct InMemoryRoadConditions {
    slots: Vec<WaypointSlot>,
    index: HashMap<String, usize>,
}

impl InMemoryRoadConditions {
    pub fn from_nodes(nodes: Vec<GeoNode>) -> TriageResult<Self> {
        let mut slots = Vec::with_capacity(nodes.len());
        let mut index = HashMap::with_capacity(nodes.len());

        for node in nodes {
            node.validate()?;
            if index.contains_key(&node.id) {
                return Err(TriageError::invalid_input(format!("途经点ID重复: {}", node.id)));
            }
            index.insert(node.id.clone(), slots.len());
            slots.push(WaypointSlot {
                id: node.id,
                lat: node.lat,
                lng: node.lng,
                factor_bits: AtomicU64::new(node.safety_factor.to_bits()),
            });
        }

        Ok(Self { slots, index })
    }

    pub fn from_config(waypoints: &[WaypointConfig]) -> TriageResult<Self> {
        let nodes = waypoints
            .iter()
            .map(WaypointConfig::to_node)
            .collect::<TriageResult<Vec<_>>>()?;
        Self::from_nodes(nodes)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl RoadConditionsStore for InMemoryRoadConditions {
    fn snapshot(&self) -> Vec<GeoNode> {
        self.slots
            .iter()
            .map(|slot| GeoNode {
                id: slot.id.clone(),
                lat: slot.lat,
                lng: slot.lng,
                safety_factor: slot.factor(),
            })
            .collect()
    }

    fn safety_factor(&self, waypoint_id: &str) -> Option<f64> {
        self.index.get(waypoint_id).map(|&i| self.slots[i].factor())
    }

    fn update_condition(&self, waypoint_id: &str, safety_factor: f64) -> TriageResult<()> {
        validate_safety_factor(safety_factor)?;
        let slot = self
            .index
            .get(waypoint_id)
            .map(|&i| &self.slots[i])
            .ok_or_else(|| TriageError::UnknownWaypoint {
                id: waypoint_id.to_string(),
            })?;

        let previous = f64::from_bits(
            slot.factor_bits
                .swap(safety_factor.to_bits(), Ordering::AcqRel),
        );
        debug!(
            "途经点 {} 安全系数 {} -> {}",
            waypoint_id, previous, safety_factor
        );
        Ok(())
    }
}
