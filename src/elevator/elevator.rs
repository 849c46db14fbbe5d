/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::error::{ElevatorError, ElevatorResult};
use crate::shared::{Behaviour, ElevatorId, Floor};

/**
 * A single simulated elevator car.
 *
 * The `Elevator` keeps its floor range, its current floor and an ordered queue of
 * target floors. The head of the queue is the current destination. Movement happens
 * one floor per `simulation_step`, and the head is dropped once the car is on it.
 *
 * # Fields
 * - `id`:                  Identifier, unique within a registry.
 * - `lowest_floor`:        Lowest reachable floor (inclusive).
 * - `highest_floor`:       Highest reachable floor (inclusive), always above `lowest_floor`.
 * - `current_floor`:       Floor the car is on, always within the range.
 * - `target_floor_queue`:  Pending stops without duplicates, head first.
 */
#[derive(Debug, Clone)]
pub struct Elevator {
    id: ElevatorId,
    lowest_floor: Floor,
    highest_floor: Floor,
    current_floor: Floor,
    target_floor_queue: Vec<Floor>,
}

impl Elevator {
    pub fn new(id: ElevatorId, lowest_floor: Floor, highest_floor: Floor) -> ElevatorResult<Elevator> {
        if highest_floor <= lowest_floor {
            return Err(ElevatorError::Domain(format!(
                "Highest floor cannot be lower than the lowest floor and floors cannot be the same: {} <= {}",
                highest_floor, lowest_floor
            )));
        }

        Ok(Elevator {
            id,
            lowest_floor,
            highest_floor,
            current_floor: Floor::clamp(0, lowest_floor, highest_floor),
            target_floor_queue: Vec::new(),
        })
    }

    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn lowest_floor(&self) -> Floor {
        self.lowest_floor
    }

    pub fn highest_floor(&self) -> Floor {
        self.highest_floor
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    /// Append `target_floor` to the end of the queue.
    pub fn schedule(&mut self, target_floor: Floor) -> ElevatorResult<()> {
        self.check_range(target_floor)?;
        self.check_not_scheduled(target_floor)?;

        self.target_floor_queue.push(target_floor);
        debug!("Elevator {} scheduled floor {}", self.id, target_floor);
        Ok(())
    }

    /**
     * Insert `target_floor` at position `offset` of the queue.
     *
     * An offset past the end appends, a negative offset inserts at the front.
     * The relative order of the floors already queued is kept.
     */
    pub fn schedule_with_offset(&mut self, target_floor: Floor, offset: i32) -> ElevatorResult<()> {
        self.check_range(target_floor)?;
        self.check_not_scheduled(target_floor)?;

        match usize::try_from(offset) {
            Ok(position) if position >= self.target_floor_queue.len() => {
                self.target_floor_queue.push(target_floor)
            }
            Ok(position) => self.target_floor_queue.insert(position, target_floor),
            Err(_) => self.target_floor_queue.insert(0, target_floor),
        }
        debug!(
            "Elevator {} scheduled floor {} with offset {}",
            self.id, target_floor, offset
        );
        Ok(())
    }

    pub fn unschedule(&mut self, target_floor: Floor) -> ElevatorResult<()> {
        if !self.target_floor_queue.contains(&target_floor) {
            return Err(ElevatorError::Domain(format!(
                "Floor: {} is not currently scheduled thus it cannot be unscheduled",
                target_floor
            )));
        }

        self.target_floor_queue.retain(|&floor| floor != target_floor);
        debug!("Elevator {} unscheduled floor {}", self.id, target_floor);
        Ok(())
    }

    /// Force the current floor, e.g. from an external position sensor.
    pub fn update(&mut self, current_floor: Floor) -> ElevatorResult<()> {
        self.check_range(current_floor)?;

        self.current_floor = current_floor;
        debug!("Elevator {} position set to floor {}", self.id, current_floor);
        Ok(())
    }

    /// Move one floor towards the head of the queue, or handle the arrival if already there.
    pub fn simulation_step(&mut self) {
        let target_floor = match self.target_floor() {
            Some(floor) => floor,
            None => return,
        };

        if target_floor > self.current_floor {
            self.current_floor += 1;
        } else if target_floor < self.current_floor {
            self.current_floor -= 1;
        } else {
            self.handle_elevator();
        }
    }

    /// Drop the head of the queue if the car is on it. Never moves the car.
    pub fn handle_elevator(&mut self) {
        if self.behaviour() == Behaviour::Arrived {
            self.target_floor_queue.remove(0);
            info!("Elevator {} arrived at floor {}", self.id, self.current_floor);
        }
    }

    /// Snapshot of `(id, current floor, current target)`.
    pub fn status(&self) -> (ElevatorId, Floor, Option<Floor>) {
        (self.id, self.current_floor, self.target_floor())
    }

    pub fn scheduled_floors(&self) -> Vec<Floor> {
        self.target_floor_queue.clone()
    }

    pub fn behaviour(&self) -> Behaviour {
        behaviour_of(self.current_floor, &self.target_floor_queue)
    }

    fn target_floor(&self) -> Option<Floor> {
        self.target_floor_queue.first().copied()
    }

    fn check_range(&self, floor: Floor) -> ElevatorResult<()> {
        if floor < self.lowest_floor || floor > self.highest_floor {
            return Err(ElevatorError::Range {
                value: floor,
                lowest: self.lowest_floor,
                highest: self.highest_floor,
            });
        }
        Ok(())
    }

    fn check_not_scheduled(&self, floor: Floor) -> ElevatorResult<()> {
        if self.target_floor_queue.contains(&floor) {
            return Err(ElevatorError::Domain(format!(
                "Floor: {} is already scheduled",
                floor
            )));
        }
        Ok(())
    }
}

/// Derive the behaviour of a car from its floor and its queue.
pub fn behaviour_of(current_floor: Floor, target_floor_queue: &[Floor]) -> Behaviour {
    match target_floor_queue.first() {
        None => Behaviour::Idle,
        Some(&target) if target == current_floor => Behaviour::Arrived,
        Some(_) => Behaviour::EnRoute,
    }
}
