//! Single-writer engine service
//!
//! Wraps a `RiskEngine` (and its external value mover) in a task that
//! consumes commands from an mpsc queue one at a time. Each command runs to
//! completion, fully committed or fully aborted, before the next is picked
//! up, which reproduces the engine's serial-execution contract for
//! concurrent callers.

use crate::auth::AuthContext;
use crate::engine::RiskEngine;
use crate::transfer::ValueMover;
use riskdesk_core::{
    AuditRecord, Counterparty, CounterpartySummary, Direction, Error, PartyId, Result,
    TransactionRecord,
};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// A command submitted to the engine task
pub enum Command {
    Register {
        auth: AuthContext,
        id: PartyId,
        credit_score: u32,
        exposure_limit: i64,
        collateral: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    Deactivate {
        auth: AuthContext,
        id: PartyId,
        reply: oneshot::Sender<Result<()>>,
    },
    AddPosition {
        auth: AuthContext,
        id: PartyId,
        amount: i64,
        direction: Direction,
        reply: oneshot::Sender<Result<()>>,
    },
    Deposit {
        auth: AuthContext,
        id: PartyId,
        amount: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    Withdraw {
        auth: AuthContext,
        id: PartyId,
        amount: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    UpdateGuarantee {
        auth: AuthContext,
        id: PartyId,
        guarantee: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    SetCoverageRatio {
        auth: AuthContext,
        pct: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    RecordTransaction {
        auth: AuthContext,
        sender: PartyId,
        receiver: PartyId,
        value: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    SendFunds {
        auth: AuthContext,
        sender: PartyId,
        receiver: PartyId,
        amount: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        id: PartyId,
        reply: oneshot::Sender<Result<Counterparty>>,
    },
    List {
        reply: oneshot::Sender<Vec<CounterpartySummary>>,
    },
    TransactionHistory {
        reply: oneshot::Sender<Vec<TransactionRecord>>,
    },
    DrainAudit {
        after_seq: u64,
        reply: oneshot::Sender<Vec<AuditRecord>>,
    },
}

/// Handle for submitting commands to a spawned engine task
#[derive(Clone)]
pub struct EngineService {
    tx: mpsc::Sender<Command>,
}

/// A spawned engine task plus its command handle
pub struct SpawnedEngine {
    pub handle: EngineService,
    pub task: tokio::task::JoinHandle<()>,
}

impl EngineService {
    /// Spawn the single-writer task owning the engine and mover
    pub fn spawn(engine: RiskEngine, mover: Box<dyn ValueMover + Send>) -> SpawnedEngine {
        let (tx, mut rx) = mpsc::channel::<Command>(64);
        let task = tokio::spawn(async move {
            let mut engine = engine;
            let mut mover = mover;
            while let Some(cmd) = rx.recv().await {
                handle_command(&mut engine, mover.as_mut(), cmd);
            }
            info!("engine service stopped");
        });
        SpawnedEngine {
            handle: EngineService { tx },
            task,
        }
    }

    async fn submit<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| Error::State("engine service unavailable".into()))?;
        rx.await
            .map_err(|_| Error::State("engine service dropped the reply".into()))
    }

    pub async fn register(
        &self,
        auth: AuthContext,
        id: PartyId,
        credit_score: u32,
        exposure_limit: i64,
        collateral: i64,
    ) -> Result<()> {
        self.submit(|reply| Command::Register {
            auth,
            id,
            credit_score,
            exposure_limit,
            collateral,
            reply,
        })
        .await?
    }

    pub async fn deactivate(&self, auth: AuthContext, id: PartyId) -> Result<()> {
        self.submit(|reply| Command::Deactivate { auth, id, reply })
            .await?
    }

    pub async fn add_position(
        &self,
        auth: AuthContext,
        id: PartyId,
        amount: i64,
        direction: Direction,
    ) -> Result<()> {
        self.submit(|reply| Command::AddPosition {
            auth,
            id,
            amount,
            direction,
            reply,
        })
        .await?
    }

    pub async fn deposit(&self, auth: AuthContext, id: PartyId, amount: i64) -> Result<()> {
        self.submit(|reply| Command::Deposit {
            auth,
            id,
            amount,
            reply,
        })
        .await?
    }

    pub async fn withdraw(&self, auth: AuthContext, id: PartyId, amount: i64) -> Result<()> {
        self.submit(|reply| Command::Withdraw {
            auth,
            id,
            amount,
            reply,
        })
        .await?
    }

    pub async fn update_guarantee(
        &self,
        auth: AuthContext,
        id: PartyId,
        guarantee: i64,
    ) -> Result<()> {
        self.submit(|reply| Command::UpdateGuarantee {
            auth,
            id,
            guarantee,
            reply,
        })
        .await?
    }

    pub async fn set_coverage_ratio(&self, auth: AuthContext, pct: i64) -> Result<()> {
        self.submit(|reply| Command::SetCoverageRatio { auth, pct, reply })
            .await?
    }

    pub async fn record_transaction(
        &self,
        auth: AuthContext,
        sender: PartyId,
        receiver: PartyId,
        value: i64,
    ) -> Result<()> {
        self.submit(|reply| Command::RecordTransaction {
            auth,
            sender,
            receiver,
            value,
            reply,
        })
        .await?
    }

    pub async fn send_funds(
        &self,
        auth: AuthContext,
        sender: PartyId,
        receiver: PartyId,
        amount: i64,
    ) -> Result<()> {
        self.submit(|reply| Command::SendFunds {
            auth,
            sender,
            receiver,
            amount,
            reply,
        })
        .await?
    }

    pub async fn snapshot(&self, id: PartyId) -> Result<Counterparty> {
        self.submit(|reply| Command::Snapshot { id, reply }).await?
    }

    pub async fn list(&self) -> Result<Vec<CounterpartySummary>> {
        self.submit(|reply| Command::List { reply }).await
    }

    pub async fn transaction_history(&self) -> Result<Vec<TransactionRecord>> {
        self.submit(|reply| Command::TransactionHistory { reply })
            .await
    }

    /// Audit records strictly after the given sequence number
    pub async fn drain_audit(&self, after_seq: u64) -> Result<Vec<AuditRecord>> {
        self.submit(|reply| Command::DrainAudit { after_seq, reply })
            .await
    }
}

fn handle_command(engine: &mut RiskEngine, mover: &mut dyn ValueMover, cmd: Command) {
    match cmd {
        Command::Register {
            auth,
            id,
            credit_score,
            exposure_limit,
            collateral,
            reply,
        } => {
            let _ = reply.send(engine.register(&auth, id, credit_score, exposure_limit, collateral));
        }
        Command::Deactivate { auth, id, reply } => {
            let _ = reply.send(engine.deactivate(&auth, &id));
        }
        Command::AddPosition {
            auth,
            id,
            amount,
            direction,
            reply,
        } => {
            let _ = reply.send(engine.add_position(&auth, &id, amount, direction));
        }
        Command::Deposit {
            auth,
            id,
            amount,
            reply,
        } => {
            let _ = reply.send(engine.deposit(&auth, &id, amount));
        }
        Command::Withdraw {
            auth,
            id,
            amount,
            reply,
        } => {
            let _ = reply.send(engine.withdraw(&auth, &id, amount));
        }
        Command::UpdateGuarantee {
            auth,
            id,
            guarantee,
            reply,
        } => {
            let _ = reply.send(engine.update_guarantee(&auth, &id, guarantee));
        }
        Command::SetCoverageRatio { auth, pct, reply } => {
            let _ = reply.send(engine.set_coverage_ratio(&auth, pct));
        }
        Command::RecordTransaction {
            auth,
            sender,
            receiver,
            value,
            reply,
        } => {
            let _ = reply.send(engine.record_transaction(&auth, &sender, &receiver, value));
        }
        Command::SendFunds {
            auth,
            sender,
            receiver,
            amount,
            reply,
        } => {
            let _ = reply.send(engine.send_funds(&auth, mover, &sender, &receiver, amount));
        }
        Command::Snapshot { id, reply } => {
            let _ = reply.send(engine.counterparty(&id).cloned());
        }
        Command::List { reply } => {
            let _ = reply.send(engine.list().collect());
        }
        Command::TransactionHistory { reply } => {
            let _ = reply.send(engine.transaction_history().to_vec());
        }
        Command::DrainAudit { after_seq, reply } => {
            let _ = reply.send(engine.audit_since(after_seq).to_vec());
        }
    }
}
