/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::info;
use std::collections::HashMap;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::elevator::Elevator;
use crate::elevator::error::{ElevatorError, ElevatorResult};
use crate::shared::{ElevatorId, ElevatorSpec, ElevatorStatus, Floor};

/**
 * Addresses a bank of elevators by id.
 *
 * Id-based requests are resolved to the owning `Elevator` and delegated to it.
 * Errors from the elevator are passed through untouched. Bulk operations visit
 * the elevators in the order they were added.
 *
 * # Fields
 * - `elevators`:   Elevators keyed by id.
 * - `order`:       Ids in insertion order.
 */
#[derive(Debug, Default)]
pub struct ElevatorRegistry {
    elevators: HashMap<ElevatorId, Elevator>,
    order: Vec<ElevatorId>,
}

impl ElevatorRegistry {
    pub fn new() -> ElevatorRegistry {
        ElevatorRegistry::default()
    }

    pub fn add(&mut self, elevator: Elevator) -> ElevatorResult<()> {
        let id = elevator.id();
        if self.elevators.contains_key(&id) {
            return Err(ElevatorError::Domain(format!(
                "An elevator with id: {} is already being managed",
                id
            )));
        }

        info!(
            "Managing elevator {} with floors [{}, {}]",
            id,
            elevator.lowest_floor(),
            elevator.highest_floor()
        );
        self.elevators.insert(id, elevator);
        self.order.push(id);
        Ok(())
    }

    pub fn remove(&mut self, id: ElevatorId) -> ElevatorResult<()> {
        if self.elevators.remove(&id).is_none() {
            return Err(not_found(id));
        }

        self.order.retain(|&managed| managed != id);
        info!("Elevator {} removed", id);
        Ok(())
    }

    /// Build and add one elevator per spec. Stops at the first failure, keeping the ones already added.
    pub fn add_from_config(&mut self, specs: &[ElevatorSpec]) -> ElevatorResult<()> {
        for spec in specs {
            let elevator = Elevator::new(spec.id, spec.lowest_floor, spec.highest_floor)?;
            self.add(elevator)?;
        }
        Ok(())
    }

    pub fn get(&self, id: ElevatorId) -> ElevatorResult<&Elevator> {
        self.elevators.get(&id).ok_or_else(|| not_found(id))
    }

    fn get_mut(&mut self, id: ElevatorId) -> ElevatorResult<&mut Elevator> {
        self.elevators.get_mut(&id).ok_or_else(|| not_found(id))
    }

    pub fn schedule(&mut self, id: ElevatorId, target_floor: Floor) -> ElevatorResult<()> {
        self.get_mut(id)?.schedule(target_floor)
    }

    pub fn schedule_with_offset(
        &mut self,
        id: ElevatorId,
        target_floor: Floor,
        offset: i32,
    ) -> ElevatorResult<()> {
        self.get_mut(id)?.schedule_with_offset(target_floor, offset)
    }

    pub fn unschedule(&mut self, id: ElevatorId, target_floor: Floor) -> ElevatorResult<()> {
        self.get_mut(id)?.unschedule(target_floor)
    }

    pub fn update(&mut self, id: ElevatorId, current_floor: Floor) -> ElevatorResult<()> {
        self.get_mut(id)?.update(current_floor)
    }

    pub fn status(&self, id: ElevatorId) -> ElevatorResult<ElevatorStatus> {
        Ok(ElevatorStatus::from(self.get(id)?.status()))
    }

    pub fn scheduled_floors(&self, id: ElevatorId) -> ElevatorResult<Vec<Floor>> {
        Ok(self.get(id)?.scheduled_floors())
    }

    /// Advance every elevator by one step.
    pub fn simulation_step(&mut self) {
        for id in &self.order {
            if let Some(elevator) = self.elevators.get_mut(id) {
                elevator.simulation_step();
            }
        }
    }

    /// Process arrivals on every elevator without moving any of them.
    pub fn handle_elevators(&mut self) {
        for id in &self.order {
            if let Some(elevator) = self.elevators.get_mut(id) {
                elevator.handle_elevator();
            }
        }
    }

    /// Floor ranges of the managed elevators, in insertion order.
    pub fn specs(&self) -> Vec<ElevatorSpec> {
        self.order
            .iter()
            .filter_map(|id| self.elevators.get(id))
            .map(|elevator| ElevatorSpec {
                id: elevator.id(),
                lowest_floor: elevator.lowest_floor(),
                highest_floor: elevator.highest_floor(),
            })
            .collect()
    }

    pub fn ids(&self) -> &[ElevatorId] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn not_found(id: ElevatorId) -> ElevatorError {
    ElevatorError::Domain(format!("Elevator with id: {} does not exist", id))
}
