// 🗄️ Catalog Storage - SQLite source of the immutable collections
//
// The core never writes here while browsing. This module only seeds the
// tables and hands whole collections to `Catalog::new`.
// Tag lists are stored as JSON text, timestamps as RFC 3339.

use crate::catalog::Catalog;
use crate::entities::{Broker, Provider, RiskLevel, Testimonial};
use crate::error::CatalogError;
use crate::seed;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

/// Tables owned by this module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Providers,
    Brokers,
    Testimonials,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Providers => "providers",
            Table::Brokers => "brokers",
            Table::Testimonials => "testimonials",
        }
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS providers (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            win_rate INTEGER NOT NULL,
            trades_last_month INTEGER NOT NULL,
            signal_types TEXT NOT NULL,
            subscription_price INTEGER NOT NULL,
            currency TEXT NOT NULL,
            rating REAL NOT NULL,
            followers INTEGER NOT NULL,
            description TEXT NOT NULL,
            risk_level TEXT NOT NULL,
            avg_pips_profit_monthly INTEGER NOT NULL,
            verified INTEGER NOT NULL,
            affiliate_url TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS brokers (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            account_types TEXT NOT NULL,
            min_deposit INTEGER NOT NULL,
            max_leverage TEXT NOT NULL,
            spreads_from REAL NOT NULL,
            currency TEXT NOT NULL,
            bonus TEXT,
            rating REAL NOT NULL,
            regulation TEXT NOT NULL,
            instruments TEXT NOT NULL,
            platforms_supported TEXT NOT NULL,
            withdrawal_time TEXT NOT NULL,
            customer_support TEXT NOT NULL,
            verified INTEGER NOT NULL,
            affiliate_url TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS testimonials (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            avatar TEXT NOT NULL,
            rating INTEGER NOT NULL,
            text TEXT NOT NULL,
            location TEXT NOT NULL,
            approved INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_testimonials_approved ON testimonials(approved)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// INSERTS (idempotent on id)
// ============================================================================

pub fn insert_providers(conn: &Connection, providers: &[Provider]) -> Result<usize> {
    let mut inserted = 0;

    for p in providers {
        inserted += conn
            .execute(
                "INSERT OR IGNORE INTO providers (
                    id, name, win_rate, trades_last_month, signal_types,
                    subscription_price, currency, rating, followers, description,
                    risk_level, avg_pips_profit_monthly, verified, affiliate_url,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    p.id,
                    p.name,
                    p.win_rate,
                    p.trades_last_month,
                    serde_json::to_string(&p.signal_types)?,
                    p.subscription_price,
                    p.currency,
                    p.rating,
                    p.followers,
                    p.description,
                    p.risk_level.as_str(),
                    p.avg_pips_profit_monthly,
                    p.verified,
                    p.affiliate_url,
                    p.created_at.to_rfc3339(),
                    p.updated_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("Failed to insert provider {}", p.id))?;
    }

    log_insert(Table::Providers, providers.len(), inserted);
    Ok(inserted)
}

pub fn insert_brokers(conn: &Connection, brokers: &[Broker]) -> Result<usize> {
    let mut inserted = 0;

    for b in brokers {
        inserted += conn
            .execute(
                "INSERT OR IGNORE INTO brokers (
                    id, name, account_types, min_deposit, max_leverage, spreads_from,
                    currency, bonus, rating, regulation, instruments, platforms_supported,
                    withdrawal_time, customer_support, verified, affiliate_url,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                params![
                    b.id,
                    b.name,
                    serde_json::to_string(&b.account_types)?,
                    b.min_deposit,
                    b.max_leverage,
                    b.spreads_from,
                    b.currency,
                    b.bonus,
                    b.rating,
                    serde_json::to_string(&b.regulation)?,
                    serde_json::to_string(&b.instruments)?,
                    serde_json::to_string(&b.platforms_supported)?,
                    b.withdrawal_time,
                    b.customer_support,
                    b.verified,
                    b.affiliate_url,
                    b.created_at.to_rfc3339(),
                    b.updated_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("Failed to insert broker {}", b.id))?;
    }

    log_insert(Table::Brokers, brokers.len(), inserted);
    Ok(inserted)
}

pub fn insert_testimonials(conn: &Connection, testimonials: &[Testimonial]) -> Result<usize> {
    let mut inserted = 0;

    for t in testimonials {
        inserted += conn
            .execute(
                "INSERT OR IGNORE INTO testimonials (
                    id, name, role, avatar, rating, text, location, approved, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    t.id,
                    t.name,
                    t.role,
                    t.avatar,
                    t.rating,
                    t.text,
                    t.location,
                    t.approved,
                    t.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("Failed to insert testimonial {}", t.id))?;
    }

    log_insert(Table::Testimonials, testimonials.len(), inserted);
    Ok(inserted)
}

fn log_insert(table: Table, offered: usize, inserted: usize) {
    tracing::info!(
        table = table.as_str(),
        inserted,
        duplicates = offered - inserted,
        "rows written"
    );
}

// ============================================================================
// QUERIES (source order = insertion order)
// ============================================================================

pub fn get_all_providers(conn: &Connection) -> Result<Vec<Provider>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, win_rate, trades_last_month, signal_types,
                subscription_price, currency, rating, followers, description,
                risk_level, avg_pips_profit_monthly, verified, affiliate_url,
                created_at, updated_at
         FROM providers
         ORDER BY seq",
    )?;

    let providers = stmt
        .query_map([], |row| {
            Ok(Provider {
                id: row.get(0)?,
                name: row.get(1)?,
                win_rate: row.get(2)?,
                trades_last_month: row.get(3)?,
                signal_types: tags_column(row, 4)?,
                subscription_price: row.get(5)?,
                currency: row.get(6)?,
                rating: row.get(7)?,
                followers: row.get(8)?,
                description: row.get(9)?,
                risk_level: risk_column(row, 10)?,
                avg_pips_profit_monthly: row.get(11)?,
                verified: row.get(12)?,
                affiliate_url: row.get(13)?,
                created_at: time_column(row, 14)?,
                updated_at: time_column(row, 15)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(providers)
}

pub fn get_all_brokers(conn: &Connection) -> Result<Vec<Broker>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, account_types, min_deposit, max_leverage, spreads_from,
                currency, bonus, rating, regulation, instruments, platforms_supported,
                withdrawal_time, customer_support, verified, affiliate_url,
                created_at, updated_at
         FROM brokers
         ORDER BY seq",
    )?;

    let brokers = stmt
        .query_map([], |row| {
            Ok(Broker {
                id: row.get(0)?,
                name: row.get(1)?,
                account_types: tags_column(row, 2)?,
                min_deposit: row.get(3)?,
                max_leverage: row.get(4)?,
                spreads_from: row.get(5)?,
                currency: row.get(6)?,
                bonus: row.get(7)?,
                rating: row.get(8)?,
                regulation: tags_column(row, 9)?,
                instruments: tags_column(row, 10)?,
                platforms_supported: tags_column(row, 11)?,
                withdrawal_time: row.get(12)?,
                customer_support: row.get(13)?,
                verified: row.get(14)?,
                affiliate_url: row.get(15)?,
                created_at: time_column(row, 16)?,
                updated_at: time_column(row, 17)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(brokers)
}

/// The carousel sequence: approved testimonials in insertion order
pub fn get_approved_testimonials(conn: &Connection) -> Result<Vec<Testimonial>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, role, avatar, rating, text, location, approved, created_at
         FROM testimonials
         WHERE approved = 1
         ORDER BY seq",
    )?;

    let testimonials = stmt
        .query_map([], |row| {
            Ok(Testimonial {
                id: row.get(0)?,
                name: row.get(1)?,
                role: row.get(2)?,
                avatar: row.get(3)?,
                rating: row.get(4)?,
                text: row.get(5)?,
                location: row.get(6)?,
                approved: row.get(7)?,
                created_at: time_column(row, 8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(testimonials)
}

pub fn count_rows(conn: &Connection, table: Table) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;

    Ok(count)
}

fn tags_column(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn risk_column(row: &Row, idx: usize) -> rusqlite::Result<RiskLevel> {
    let raw: String = row.get(idx)?;
    raw.parse::<RiskLevel>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn time_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ============================================================================
// SEEDING + LOADING
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub providers: usize,
    pub brokers: usize,
    pub testimonials: usize,
}

/// Seed each table with the launch data, but only if it is empty
pub fn seed_if_empty(conn: &Connection) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if count_rows(conn, Table::Providers)? == 0 {
        report.providers = insert_providers(conn, &seed::default_providers()?)?;
    }
    if count_rows(conn, Table::Brokers)? == 0 {
        report.brokers = insert_brokers(conn, &seed::default_brokers()?)?;
    }
    if count_rows(conn, Table::Testimonials)? == 0 {
        report.testimonials = insert_testimonials(conn, &seed::default_testimonials()?)?;
    }

    Ok(report)
}

/// Everything the browsing surface needs, loaded once
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub providers: Catalog<Provider>,
    pub brokers: Catalog<Broker>,
    pub testimonials: Vec<Testimonial>,
}

pub fn load_snapshot(conn: &Connection) -> Result<CatalogSnapshot> {
    let providers = Catalog::new(get_all_providers(conn)?).context("Invalid provider catalog")?;
    let brokers = Catalog::new(get_all_brokers(conn)?).context("Invalid broker catalog")?;
    let testimonials = get_approved_testimonials(conn)?;
    for t in &testimonials {
        t.validate().map_err(|reason| CatalogError::InvalidEntity {
            id: t.id.clone(),
            reason,
        })?;
    }

    tracing::info!(
        providers = providers.len(),
        brokers = brokers.len(),
        testimonials = testimonials.len(),
        "catalog snapshot loaded"
    );

    Ok(CatalogSnapshot {
        providers,
        brokers,
        testimonials,
    })
}

// ============================================================================
// TESTS
// ============================================================================
