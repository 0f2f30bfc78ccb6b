use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgRow, PgConnection, PgPool, Row};
use tracing::{debug, info, instrument, warn};

use super::{CommittedMatch, EntityStore};
use crate::league::{
    Corporation, CorporationId, LeagueError, Match, MatchId, Player, PlayerId, Score, ScoreEntry,
};

/// PostgreSQL implementation of the entity store
///
/// Table and column names follow the league's existing schema
/// (see `migrations/0001_league.sql`).
pub struct PostgresEntityStore {
    pool: PgPool,
}

impl PostgresEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, LeagueError> {
        let pool = PgPool::connect(database_url).await.map_err(|e| {
            warn!(error = %e, "Failed to connect to database");
            LeagueError::AdapterUnavailable(e.to_string())
        })?;
        Ok(Self::new(pool))
    }
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> LeagueError {
    move |e| {
        warn!(error = %e, context, "Database operation failed");
        LeagueError::AdapterUnavailable(format!("{context}: {e}"))
    }
}

fn column_out_of_range(column: &str, value: i32) -> LeagueError {
    LeagueError::AdapterUnavailable(format!("stored {column} out of range: {value}"))
}

fn column_value(column: &str, value: u32) -> Result<i32, LeagueError> {
    i32::try_from(value)
        .map_err(|_| LeagueError::InvalidScore(format!("{column} {value} does not fit the {column} column")))
}

fn score_from_row(row: &PgRow) -> Result<Score, LeagueError> {
    let points: i32 = row.try_get("points").map_err(db_error("decode score"))?;
    let ranking: i32 = row.try_get("ranking").map_err(db_error("decode score"))?;
    let cubes: i32 = row
        .try_get("black_cubes_left")
        .map_err(db_error("decode score"))?;

    Ok(Score {
        match_id: MatchId(row.try_get("match_id").map_err(db_error("decode score"))?),
        player_id: PlayerId(row.try_get("person_id").map_err(db_error("decode score"))?),
        corporation_id: CorporationId(
            row.try_get("corporation_id")
                .map_err(db_error("decode score"))?,
        ),
        points: u32::try_from(points).map_err(|_| column_out_of_range("points", points))?,
        ranking: u32::try_from(ranking).map_err(|_| column_out_of_range("ranking", ranking))?,
        cubes_remaining: u8::try_from(cubes)
            .map_err(|_| column_out_of_range("black_cubes_left", cubes))?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, LeagueError> {
    Ok(Match {
        id: MatchId(row.try_get("id").map_err(db_error("decode match"))?),
        occurred_on: row
            .try_get("occured_on")
            .map_err(db_error("decode match"))?,
    })
}

async fn insert_match(conn: &mut PgConnection, occurred_on: NaiveDate) -> Result<Match, LeagueError> {
    let row = sqlx::query("INSERT INTO tm_matches (occured_on) VALUES ($1) RETURNING id, occured_on")
        .bind(occurred_on)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error("insert match"))?;

    match_from_row(&row)
}

async fn insert_scores(
    conn: &mut PgConnection,
    match_id: MatchId,
    entries: &[ScoreEntry],
) -> Result<u64, LeagueError> {
    let mut committed = 0;
    for entry in entries {
        let result = sqlx::query(
            "INSERT INTO tm_scores (match_id, person_id, corporation_id, points, ranking, black_cubes_left) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(match_id)
        .bind(entry.player_id)
        .bind(entry.corporation_id)
        .bind(column_value("points", entry.points)?)
        .bind(column_value("ranking", entry.ranking)?)
        .bind(i32::from(entry.cubes_remaining))
        .execute(&mut *conn)
        .await
        .map_err(db_error("insert score"))?;

        committed += result.rows_affected();
    }
    Ok(committed)
}

#[async_trait]
impl EntityStore for PostgresEntityStore {
    #[instrument(skip(self))]
    async fn fetch_players(&self) -> Result<Vec<Player>, LeagueError> {
        let rows = sqlx::query("SELECT id, name FROM tm_people ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("fetch players"))?;

        let players = rows
            .iter()
            .map(|row| {
                Ok(Player {
                    id: PlayerId(row.try_get("id").map_err(db_error("decode player"))?),
                    name: row.try_get("name").map_err(db_error("decode player"))?,
                })
            })
            .collect::<Result<Vec<_>, LeagueError>>()?;

        debug!(count = players.len(), "Fetched players from database");
        Ok(players)
    }

    #[instrument(skip(self))]
    async fn fetch_corporations(&self) -> Result<Vec<Corporation>, LeagueError> {
        let rows = sqlx::query(
            "SELECT c.id, c.name, c.pack_id, p.name AS pack_name FROM tm_corporations c LEFT JOIN tm_packs p ON p.id = c.pack_id ORDER BY c.id",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("fetch corporations"))?;

        let corporations = rows
            .iter()
            .map(|row| {
                Ok(Corporation {
                    id: CorporationId(row.try_get("id").map_err(db_error("decode corporation"))?),
                    name: row.try_get("name").map_err(db_error("decode corporation"))?,
                    pack_id: row
                        .try_get("pack_id")
                        .map_err(db_error("decode corporation"))?,
                    pack_name: row
                        .try_get("pack_name")
                        .map_err(db_error("decode corporation"))?,
                })
            })
            .collect::<Result<Vec<_>, LeagueError>>()?;

        debug!(count = corporations.len(), "Fetched corporations from database");
        Ok(corporations)
    }

    #[instrument(skip(self))]
    async fn fetch_matches(&self) -> Result<Vec<Match>, LeagueError> {
        let rows = sqlx::query("SELECT id, occured_on FROM tm_matches ORDER BY occured_on, id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("fetch matches"))?;

        rows.iter().map(match_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn fetch_match(&self, id: MatchId) -> Result<Match, LeagueError> {
        let row = sqlx::query("SELECT id, occured_on FROM tm_matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch match"))?;

        match row {
            Some(row) => match_from_row(&row),
            None => {
                debug!(match_id = %id, "Match not found in database");
                Err(LeagueError::NotFound(format!("match {id}")))
            }
        }
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn fetch_scores_by_match(&self, ids: &[MatchId]) -> Result<Vec<Score>, LeagueError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query(
            "SELECT match_id, person_id, corporation_id, points, ranking, black_cubes_left FROM tm_scores WHERE match_id = ANY($1)",
        )
        .bind(raw_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("fetch scores"))?;

        rows.iter().map(score_from_row).collect()
    }

    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    async fn insert_match_with_scores(
        &self,
        occurred_on: NaiveDate,
        entries: &[ScoreEntry],
    ) -> Result<CommittedMatch, LeagueError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let league_match = insert_match(&mut *tx, occurred_on).await?;
        let scores_committed = insert_scores(&mut *tx, league_match.id, entries).await?;

        // Dropping the transaction on an earlier `?` rolls both inserts back
        tx.commit().await.map_err(db_error("commit match"))?;

        info!(match_id = %league_match.id, scores_committed, "Match committed to database");
        Ok(CommittedMatch {
            league_match,
            scores_committed,
        })
    }
}
