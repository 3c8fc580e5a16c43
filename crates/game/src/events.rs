//! Notable world changes, queued during a tick and drained by the host.

use crate::object_manager::TickReport;
use crate::objects::ObjectId;

#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    PlanetMaterialized { planet: usize, objects: usize },
    MazeBuilt { maze: usize, tiles: usize, ships: usize },
    Promoted(ObjectId),
    Demoted(ObjectId),
    Removed(ObjectId),
    /// A ship embedded in planet ground was put back above the atmosphere.
    Recovered(ObjectId),
    Burned { id: ObjectId, damage: f32 },
}

impl WorldEvent {
    /// Streaming events of one manager tick, in promotion, demotion, removal order.
    pub fn from_report(report: &TickReport) -> impl Iterator<Item = WorldEvent> + '_ {
        report
            .promoted
            .iter()
            .map(|id| WorldEvent::Promoted(*id))
            .chain(report.demoted.iter().map(|id| WorldEvent::Demoted(*id)))
            .chain(report.removed.iter().map(|id| WorldEvent::Removed(*id)))
    }
}
