/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};
use std::thread::{Builder, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::{Elevator, ElevatorError, ElevatorRegistry, ElevatorResult};
use crate::shared::{ElevatorId, ElevatorSpec, ElevatorStatus, Floor};

/***************************************/
/*               Enums                 */
/***************************************/
type Reply<T> = oneshot::Sender<ElevatorResult<T>>;

pub enum Request {
    Add { spec: ElevatorSpec, reply: Reply<()> },
    Remove { id: ElevatorId, reply: Reply<()> },
    Schedule { id: ElevatorId, target_floor: Floor, reply: Reply<()> },
    ScheduleWithOffset { id: ElevatorId, target_floor: Floor, offset: i32, reply: Reply<()> },
    Unschedule { id: ElevatorId, target_floor: Floor, reply: Reply<()> },
    Update { id: ElevatorId, current_floor: Floor, reply: Reply<()> },
    Status { id: ElevatorId, reply: Reply<ElevatorStatus> },
    ScheduledFloors { id: ElevatorId, reply: Reply<Vec<Floor>> },
    Specs { reply: Reply<Vec<ElevatorSpec>> },
}

/// Which driver advances the elevators. Exactly one is active per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    /// Step every elevator on a fixed interval.
    Simulation(Duration),
    /// Process arrivals after every handled request.
    PerRequest,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Elevator(#[from] ElevatorError),
    #[error("elevator service is not running")]
    Unavailable,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Owns the elevator registry and serialises every access to it.
 *
 * The service runs on its own thread. Requests arrive over a channel and are handled
 * one at a time, so the tick driver and the request handlers never touch the registry
 * concurrently.
 *
 * # Fields
 * - `registry`:        The managed elevators.
 * - `mode`:            Active drive mode.
 * - `request_rx`:      Receives requests from `ServiceHandle`s.
 * - `terminate_rx`:    Stops the main loop.
 */
pub struct ElevatorService {
    registry: ElevatorRegistry,
    mode: DriveMode,
    request_rx: cbc::Receiver<Request>,
    terminate_rx: cbc::Receiver<()>,
}

impl ElevatorService {
    pub fn new(
        registry: ElevatorRegistry,
        mode: DriveMode,
        request_rx: cbc::Receiver<Request>,
        terminate_rx: cbc::Receiver<()>,
    ) -> ElevatorService {
        ElevatorService {
            registry,
            mode,
            request_rx,
            terminate_rx,
        }
    }

    pub fn run(mut self) {
        let ticker = match self.mode {
            DriveMode::Simulation(interval) => cbc::tick(interval),
            DriveMode::PerRequest => cbc::never(),
        };
        if self.registry.is_empty() {
            warn!("Elevator service started without any elevators");
        }
        info!(
            "Elevator service running {:?} with elevators {:?}",
            self.mode,
            self.registry.ids()
        );

        loop {
            cbc::select! {
                recv(self.request_rx) -> request => {
                    match request {
                        Ok(request) => {
                            self.handle_request(request);
                            if self.mode == DriveMode::PerRequest {
                                self.registry.handle_elevators();
                            }
                        }
                        Err(_) => {
                            warn!("Request channel closed, stopping elevator service");
                            break;
                        }
                    }
                }
                recv(ticker) -> _ => {
                    self.registry.simulation_step();
                }
                recv(self.terminate_rx) -> _ => {
                    info!("Elevator service terminated");
                    break;
                }
            }
        }
    }

    fn handle_request(&mut self, request: Request) {
        let registry = &mut self.registry;
        match request {
            Request::Add { spec, reply } => {
                let result = Elevator::new(spec.id, spec.lowest_floor, spec.highest_floor)
                    .and_then(|elevator| registry.add(elevator));
                let _ = reply.send(result);
            }
            Request::Remove { id, reply } => {
                let _ = reply.send(registry.remove(id));
            }
            Request::Schedule { id, target_floor, reply } => {
                let _ = reply.send(registry.schedule(id, target_floor));
            }
            Request::ScheduleWithOffset { id, target_floor, offset, reply } => {
                let _ = reply.send(registry.schedule_with_offset(id, target_floor, offset));
            }
            Request::Unschedule { id, target_floor, reply } => {
                let _ = reply.send(registry.unschedule(id, target_floor));
            }
            Request::Update { id, current_floor, reply } => {
                let _ = reply.send(registry.update(id, current_floor));
            }
            Request::Status { id, reply } => {
                let _ = reply.send(registry.status(id));
            }
            Request::ScheduledFloors { id, reply } => {
                let _ = reply.send(registry.scheduled_floors(id));
            }
            Request::Specs { reply } => {
                let _ = reply.send(Ok(registry.specs()));
            }
        }
    }
}

/// Cloneable client side of the service, used by the request handlers.
#[derive(Clone)]
pub struct ServiceHandle {
    request_tx: cbc::Sender<Request>,
}

impl ServiceHandle {
    pub fn new(request_tx: cbc::Sender<Request>) -> ServiceHandle {
        ServiceHandle { request_tx }
    }

    async fn call<T>(&self, request: impl FnOnce(Reply<T>) -> Request) -> Result<T, ServiceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request_tx
            .send(request(reply_tx))
            .map_err(|_| ServiceError::Unavailable)?;
        let result = reply_rx.await.map_err(|_| ServiceError::Unavailable)?;
        Ok(result?)
    }

    pub async fn add(&self, spec: ElevatorSpec) -> Result<(), ServiceError> {
        self.call(|reply| Request::Add { spec, reply }).await
    }

    pub async fn remove(&self, id: ElevatorId) -> Result<(), ServiceError> {
        self.call(|reply| Request::Remove { id, reply }).await
    }

    pub async fn schedule(&self, id: ElevatorId, target_floor: Floor) -> Result<(), ServiceError> {
        self.call(|reply| Request::Schedule { id, target_floor, reply }).await
    }

    pub async fn schedule_with_offset(
        &self,
        id: ElevatorId,
        target_floor: Floor,
        offset: i32,
    ) -> Result<(), ServiceError> {
        self.call(|reply| Request::ScheduleWithOffset { id, target_floor, offset, reply })
            .await
    }

    pub async fn unschedule(&self, id: ElevatorId, target_floor: Floor) -> Result<(), ServiceError> {
        self.call(|reply| Request::Unschedule { id, target_floor, reply }).await
    }

    pub async fn update(&self, id: ElevatorId, current_floor: Floor) -> Result<(), ServiceError> {
        self.call(|reply| Request::Update { id, current_floor, reply }).await
    }

    pub async fn status(&self, id: ElevatorId) -> Result<ElevatorStatus, ServiceError> {
        self.call(|reply| Request::Status { id, reply }).await
    }

    pub async fn scheduled_floors(&self, id: ElevatorId) -> Result<Vec<Floor>, ServiceError> {
        self.call(|reply| Request::ScheduledFloors { id, reply }).await
    }

    pub async fn specs(&self) -> Result<Vec<ElevatorSpec>, ServiceError> {
        self.call(|reply| Request::Specs { reply }).await
    }
}

/// A service thread together with the channels needed to reach and stop it.
pub struct RunningService {
    pub handle: ServiceHandle,
    terminate_tx: cbc::Sender<()>,
    thread: JoinHandle<()>,
}

impl RunningService {
    pub fn shutdown(self) {
        let _ = self.terminate_tx.send(());
        if self.thread.join().is_err() {
            warn!("Elevator service thread panicked");
        }
    }
}

pub fn start(registry: ElevatorRegistry, mode: DriveMode) -> std::io::Result<RunningService> {
    let (request_tx, request_rx) = cbc::unbounded::<Request>();
    let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();

    let service = ElevatorService::new(registry, mode, request_rx, terminate_rx);
    let thread = Builder::new()
        .name("elevator_service".into())
        .spawn(move || service.run())?;

    Ok(RunningService {
        handle: ServiceHandle::new(request_tx),
        terminate_tx,
        thread,
    })
}
