//! [`Collective`] over a lamellar world.
//!
//! Payloads travel as active messages into Darc backed mailboxes; world
//! barriers delimit each round so a mailbox is never refilled before every PE
//! has read it.

use crate::collective::{collect_slots, Collective, COORDINATOR};
use crate::error::CollectiveError;

use lamellar::active_messaging::prelude::*;
use lamellar::darc::prelude::*;
use parking_lot::Mutex;
use tracing::trace;

#[lamellar::AmData]
struct ReplicaAm {
    mailbox: Darc<Mutex<Option<Vec<u8>>>>,
    payload: Vec<u8>,
}

#[lamellar::am]
impl LamellarAM for ReplicaAm {
    async fn exec() {
        *self.mailbox.lock() = Some(self.payload.clone());
    }
}

#[lamellar::AmData]
struct GatherAm {
    inbox: Darc<Mutex<Vec<Option<Vec<u8>>>>>,
    rank: usize,
    payload: Vec<u8>,
}

#[lamellar::am]
impl LamellarAM for GatherAm {
    async fn exec() {
        let mut inbox = self.inbox.lock();
        if let Some(slot) = inbox.get_mut(self.rank) {
            *slot = Some(self.payload.clone());
        }
    }
}

pub struct LamellarCollective {
    world: LamellarWorld,
    mailbox: Darc<Mutex<Option<Vec<u8>>>>,
    inbox: Darc<Mutex<Vec<Option<Vec<u8>>>>>,
}

impl LamellarCollective {
    /// Collective call: every PE of `world` must construct one.
    pub fn new(world: &LamellarWorld) -> Result<LamellarCollective, CollectiveError> {
        let mailbox = Darc::new(world, Mutex::new(None))
            .block()
            .map_err(|e| CollectiveError::Setup(format!("mailbox: {e:?}")))?;
        let inbox = Darc::new(world, Mutex::new(vec![None; world.num_pes()]))
            .block()
            .map_err(|e| CollectiveError::Setup(format!("inbox: {e:?}")))?;
        Ok(LamellarCollective {
            world: world.clone(),
            mailbox,
            inbox,
        })
    }
}

impl Collective for LamellarCollective {
    fn rank(&self) -> usize {
        self.world.my_pe()
    }

    fn num_ranks(&self) -> usize {
        self.world.num_pes()
    }

    fn broadcast(&self, payload: Option<Vec<u8>>) -> Result<Vec<u8>, CollectiveError> {
        let root = self.is_coordinator();
        if root {
            if let Some(payload) = payload {
                trace!(bytes = payload.len(), "broadcasting");
                self.world
                    .exec_am_all(ReplicaAm {
                        mailbox: self.mailbox.clone(),
                        payload,
                    })
                    .block();
            }
        }
        self.world.barrier();
        let received = self.mailbox.lock().take();
        self.world.barrier();
        match received {
            Some(bytes) => Ok(bytes),
            None if root => Err(CollectiveError::MissingRootPayload(COORDINATOR)),
            None => Err(CollectiveError::NothingReceived(self.rank())),
        }
    }

    fn barrier(&self) {
        self.world.barrier();
    }

    fn gather(&self, payload: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>, CollectiveError> {
        trace!(bytes = payload.len(), "sending counts to coordinator");
        self.world
            .exec_am_pe(
                COORDINATOR,
                GatherAm {
                    inbox: self.inbox.clone(),
                    rank: self.rank(),
                    payload,
                },
            )
            .block();
        self.world.barrier();
        let gathered = self.is_coordinator().then(|| {
            let mut inbox = self.inbox.lock();
            let size = inbox.len();
            std::mem::replace(&mut *inbox, vec![None; size])
        });
        self.world.barrier();
        match gathered {
            Some(slots) => collect_slots(slots).map(Some),
            None => Ok(None),
        }
    }
}
