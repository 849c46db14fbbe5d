/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;

/***************************************/
/*       Public data structures        */
/***************************************/
pub type ElevatorId = i32;
pub type Floor = i32;

/// What a car is doing, derived from its floor and the head of its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Idle,
    EnRoute,
    Arrived,
}

/// One entry of the `elevators` list in the configuration file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ElevatorSpec {
    pub id: ElevatorId,
    #[serde(rename = "lowestFloor")]
    pub lowest_floor: Floor,
    #[serde(rename = "highestFloor")]
    pub highest_floor: Floor,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ElevatorStatus {
    pub id: ElevatorId,
    #[serde(rename = "currentFloor")]
    pub current_floor: Floor,
    #[serde(rename = "targetFloor")]
    pub target_floor: Option<Floor>,
}

impl From<(ElevatorId, Floor, Option<Floor>)> for ElevatorStatus {
    fn from((id, current_floor, target_floor): (ElevatorId, Floor, Option<Floor>)) -> Self {
        ElevatorStatus {
            id,
            current_floor,
            target_floor,
        }
    }
}
