//! Riskdesk operator console
//!
//! Line-oriented admin console over the risk engine. Commands run strictly
//! one at a time; after each successful mutation the new audit records,
//! ledger entries, and counterparty snapshots are flushed to SQLite.

use anyhow::Context;
use riskdesk_core::{Direction, PartyId};
use riskdesk_engine::{AuthContext, CashAccounts, EngineConfig, RiskEngine};
use riskdesk_persistence::sqlite;
use riskdesk_persistence::Database;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  register <id> <credit_score> <exposure_limit> <collateral>
  deactivate <id>
  list
  pos <id> long|short <amount>
  deposit <id> <amount>
  withdraw <id> <amount>
  guarantee <id> <amount>
  ratio <pct>
  fund <id> <amount>            credit transferable cash for sends
  tx <sender> <receiver> <value>
  send <sender> <receiver> <amount>
  metrics <id>
  history [id]
  help
  quit";

struct Console {
    engine: RiskEngine,
    cash: CashAccounts,
    db: Database,
    /// Highest audit sequence number already persisted
    audit_cursor: u64,
    /// Number of ledger entries already persisted
    ledger_cursor: usize,
}

impl Console {
    /// Persist everything the last operation produced
    async fn flush(&mut self, touched: &[PartyId]) -> anyhow::Result<()> {
        for record in self.engine.audit_since(self.audit_cursor) {
            sqlite::append_audit(self.db.pool(), record).await?;
            self.audit_cursor = record.seq;
        }
        let history = self.engine.transaction_history();
        for record in &history[self.ledger_cursor..] {
            sqlite::append_ledger_entry(self.db.pool(), record).await?;
        }
        self.ledger_cursor = history.len();
        for id in touched {
            if let Ok(party) = self.engine.counterparty(id) {
                sqlite::upsert_counterparty(self.db.pool(), party).await?;
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, line: &str) -> anyhow::Result<bool> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let auth = AuthContext::Admin;
        match args.as_slice() {
            [] => {}
            ["help"] => println!("{}", HELP),
            ["quit"] | ["exit"] => return Ok(false),
            ["register", id, score, limit, collateral] => {
                let id = PartyId::from(*id);
                self.engine.register(
                    &auth,
                    id.clone(),
                    score.parse().context("credit score")?,
                    limit.parse().context("exposure limit")?,
                    collateral.parse().context("collateral")?,
                )?;
                self.flush(&[id.clone()]).await?;
                println!("registered {}", id);
            }
            ["deactivate", id] => {
                let id = PartyId::from(*id);
                self.engine.deactivate(&auth, &id)?;
                self.flush(&[id.clone()]).await?;
                println!("deactivated {}", id);
            }
            ["list"] => {
                for summary in self.engine.list() {
                    println!(
                        "{}  limit={}  exposure={}",
                        summary.id, summary.exposure_limit, summary.current_exposure
                    );
                }
            }
            ["pos", id, direction, amount] => {
                let id = PartyId::from(*id);
                let direction: Direction = direction.parse()?;
                self.engine
                    .add_position(&auth, &id, amount.parse().context("amount")?, direction)?;
                self.flush(&[id.clone()]).await?;
                let party = self.engine.counterparty(&id)?;
                if let Some(position) = party.position_history.last() {
                    sqlite::insert_position(self.db.pool(), id.as_str(), position).await?;
                }
                println!(
                    "booked {} {}: exposure={} collateral={} active={}",
                    direction.as_str(),
                    id,
                    party.current_exposure,
                    party.collateral,
                    party.active
                );
            }
            ["deposit", id, amount] => {
                let id = PartyId::from(*id);
                self.engine
                    .deposit(&auth, &id, amount.parse().context("amount")?)?;
                self.flush(&[id.clone()]).await?;
                println!("collateral now {}", self.engine.counterparty(&id)?.collateral);
            }
            ["withdraw", id, amount] => {
                let id = PartyId::from(*id);
                self.engine
                    .withdraw(&auth, &id, amount.parse().context("amount")?)?;
                self.flush(&[id.clone()]).await?;
                println!("collateral now {}", self.engine.counterparty(&id)?.collateral);
            }
            ["guarantee", id, amount] => {
                let id = PartyId::from(*id);
                self.engine
                    .update_guarantee(&auth, &id, amount.parse().context("amount")?)?;
                self.flush(&[id.clone()]).await?;
                println!("guarantee now {}", self.engine.counterparty(&id)?.guarantee);
            }
            ["ratio", pct] => {
                self.engine
                    .set_coverage_ratio(&auth, pct.parse().context("percentage")?)?;
                self.flush(&[]).await?;
                println!("coverage ratio now {}", self.engine.config().coverage_ratio_pct);
            }
            ["fund", id, amount] => {
                let id = PartyId::from(*id);
                self.cash.fund(id.clone(), amount.parse().context("amount")?);
                println!("cash balance for {} now {}", id, self.cash.balance(&id));
            }
            ["tx", sender, receiver, value] => {
                let sender = PartyId::from(*sender);
                let receiver = PartyId::from(*receiver);
                self.engine.record_transaction(
                    &auth,
                    &sender,
                    &receiver,
                    value.parse().context("value")?,
                )?;
                self.flush(&[sender.clone(), receiver.clone()]).await?;
                println!(
                    "recorded; {}->{} running sum {}",
                    sender,
                    receiver,
                    self.engine.bilateral_exposure(&sender, &receiver)
                );
            }
            ["send", sender, receiver, amount] => {
                let sender = PartyId::from(*sender);
                let receiver = PartyId::from(*receiver);
                self.engine.send_funds(
                    &auth,
                    &mut self.cash,
                    &sender,
                    &receiver,
                    amount.parse().context("amount")?,
                )?;
                self.flush(&[sender.clone(), receiver.clone()]).await?;
                println!(
                    "sent; cash {}={} {}={}",
                    sender,
                    self.cash.balance(&sender),
                    receiver,
                    self.cash.balance(&receiver)
                );
            }
            ["metrics", id] => {
                let id = PartyId::from(*id);
                let party = self.engine.counterparty(&id)?;
                println!(
                    "exposure={} limit={} collateral={} guarantee={} penalties={} active={}",
                    party.current_exposure,
                    party.exposure_limit,
                    party.collateral,
                    party.guarantee,
                    party.penalties,
                    party.active
                );
                match self.engine.coverage_ratio(&id) {
                    Ok(ratio) => println!("coverage ratio: {}%", ratio),
                    Err(e) => println!("coverage ratio: {}", e),
                }
                println!("risk score: {}", self.engine.risk_score(&id)?);
                println!("guarantee ratio: {}%", self.engine.guarantee_ratio(&id)?);
                println!("net exposure: {}", self.engine.net_exposure(&id)?);
            }
            ["history"] => {
                for record in self.engine.transaction_history() {
                    println!(
                        "{}  {} -> {}  {}",
                        record.timestamp, record.sender, record.receiver, record.value
                    );
                }
            }
            ["history", id] => {
                let id = PartyId::from(*id);
                for record in self.engine.transactions_for(&id) {
                    println!(
                        "{}  {} -> {}  {}",
                        record.timestamp, record.sender, record.receiver, record.value
                    );
                }
            }
            _ => println!("unrecognized command; try 'help'"),
        }
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riskdesk_cli=info,riskdesk_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting riskdesk operator console");

    let db_path = std::env::var("RISKDESK_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("riskdesk.db"));
    let db = Database::connect(&db_path)
        .await
        .context("opening database")?;
    tracing::info!(path = %db_path.display(), "database ready");

    let mut console = Console {
        engine: RiskEngine::new(EngineConfig::default()),
        cash: CashAccounts::new(),
        db,
        audit_cursor: 0,
        ledger_cursor: 0,
    };

    println!("riskdesk operator console; 'help' for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console.dispatch(&line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {}", e),
        }
    }

    tracing::info!("console session ended");
    Ok(())
}
