use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::utils::generate_short_id;

// 短 ID 撞号时的重试上限
const SHORT_ID_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Pickup,
    Trade,
    Hangout,
    Meetup,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Pickup => "pickup",
            Intent::Trade => "trade",
            Intent::Hangout => "hangout",
            Intent::Meetup => "meetup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(Intent::Pickup),
            "trade" => Some(Intent::Trade),
            "hangout" => Some(Intent::Hangout),
            "meetup" => Some(Intent::Meetup),
            _ => None,
        }
    }

    // 前端显示用的中文标签
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Pickup => "接送",
            Intent::Trade => "面交",
            Intent::Hangout => "吃喝玩樂",
            Intent::Meetup => "就找個點",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    Instant,
    DateSelection,
}

impl TimeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeMode::Instant => "instant",
            TimeMode::DateSelection => "date_selection",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "instant" => Some(TimeMode::Instant),
            "date_selection" => Some(TimeMode::DateSelection),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeMode::Instant => "立即聚會",
            TimeMode::DateSelection => "日期投票",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Driving,
    Transit,
    Scooter,
    Walking,
    Taxi,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Driving => "driving",
            TransportMode::Transit => "transit",
            TransportMode::Scooter => "scooter",
            TransportMode::Walking => "walking",
            TransportMode::Taxi => "taxi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "driving" => Some(TransportMode::Driving),
            "transit" => Some(TransportMode::Transit),
            "scooter" => Some(TransportMode::Scooter),
            "walking" => Some(TransportMode::Walking),
            "taxi" => Some(TransportMode::Taxi),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Driving => "開車",
            TransportMode::Transit => "大眾運輸",
            TransportMode::Scooter => "機車",
            TransportMode::Walking => "步行",
            TransportMode::Taxi => "計程車/Uber",
        }
    }
}

// gatherings 表的行，intent / time_mode 以文本落库，出库时再解析
#[derive(Debug, sqlx::FromRow)]
pub struct Gathering {
    pub id: Uuid,
    pub short_id: String,
    pub intent: String,
    pub time_mode: String,
    pub creator_name: String,
    pub creator_line_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub gathering_id: Uuid,
    pub name: String,
    pub line_id: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub transport_mode: String,
    pub is_creator: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateGatheringRequest {
    pub intent: Intent,
    pub time_mode: TimeMode,
    pub creator_name: String,
    pub creator_line_id: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub transport_mode: TransportMode,
    #[serde(default)]
    pub available_dates: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct JoinGatheringRequest {
    pub short_id: String,
    pub name: String,
    pub line_id: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub transport_mode: TransportMode,
    #[serde(default)]
    pub available_dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantInfo {
    pub id: Uuid,
    pub name: String,
    pub line_id: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub transport_mode: TransportMode,
    pub is_creator: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_dates: Option<Vec<NaiveDate>>,
}

impl TryFrom<Participant> for ParticipantInfo {
    type Error = sqlx::Error;

    fn try_from(p: Participant) -> Result<Self, Self::Error> {
        let transport_mode = TransportMode::parse(&p.transport_mode).ok_or_else(|| {
            sqlx::Error::Protocol(format!("unknown transport_mode: {}", p.transport_mode))
        })?;
        Ok(ParticipantInfo {
            id: p.id,
            name: p.name,
            line_id: p.line_id,
            location: p.location,
            latitude: p.latitude,
            longitude: p.longitude,
            transport_mode,
            is_creator: p.is_creator,
            available_dates: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct GatheringInfo {
    pub short_id: String,
    pub intent: Intent,
    pub time_mode: TimeMode,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<ParticipantInfo>,
}

#[derive(Debug, Serialize)]
pub struct CreateGatheringResponse {
    pub short_id: String,
    pub share_url: String,
    pub share_message: String,
}

#[derive(Debug, Serialize)]
pub struct CommonDatesResponse {
    pub common_dates: Vec<NaiveDate>,
}

// 分享到 LINE 的预设文案
pub fn share_message(intent: Intent, time_mode: TimeMode, join_url: &str) -> String {
    let when = match time_mode {
        TimeMode::Instant => "立即/今天",
        TimeMode::DateSelection => "日期投票中",
    };
    format!(
        "🎉 {} 聚會邀請\n\n⏰ {}\n\n點擊連結加入：\n{}",
        intent.label(),
        when,
        join_url
    )
}

// 全员命中才算共同日期；重复行去重，零参与者时交集为空
pub fn intersect_dates(rows: &[(Uuid, NaiveDate)], participant_count: usize) -> Vec<NaiveDate> {
    if participant_count == 0 {
        return Vec::new();
    }

    let mut chosen: BTreeMap<NaiveDate, HashSet<Uuid>> = BTreeMap::new();
    for (participant_id, date) in rows {
        chosen.entry(*date).or_default().insert(*participant_id);
    }

    chosen
        .into_iter()
        .filter(|(_, voters)| voters.len() == participant_count)
        .map(|(date, _)| date)
        .collect()
}

impl Gathering {
    pub async fn create(
        pool: &PgPool,
        req: &CreateGatheringRequest,
    ) -> Result<String, sqlx::Error> {
        // 短 ID 撞号时换一个再试，次数用尽报错
        for _ in 0..SHORT_ID_MAX_ATTEMPTS {
            let short_id = generate_short_id();
            match Self::insert_with_creator(pool, &short_id, req).await {
                Ok(()) => return Ok(short_id),
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                    tracing::warn!("Short id collision, retrying: {}", short_id);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(sqlx::Error::Protocol(
            "short id generation exhausted retries".into(),
        ))
    }

    // 聚会、发起人参与记录、可用日期在同一事务内写入
    async fn insert_with_creator(
        pool: &PgPool,
        short_id: &str,
        req: &CreateGatheringRequest,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let gathering_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO gatherings (id, short_id, intent, time_mode, creator_name, creator_line_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(gathering_id)
        .bind(short_id)
        .bind(req.intent.as_str())
        .bind(req.time_mode.as_str())
        .bind(&req.creator_name)
        .bind(&req.creator_line_id)
        .execute(&mut *tx)
        .await?;

        let participant_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO participants (id, gathering_id, name, line_id, location, latitude, longitude, transport_mode, is_creator)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            "#,
        )
        .bind(participant_id)
        .bind(gathering_id)
        .bind(&req.creator_name)
        .bind(&req.creator_line_id)
        .bind(&req.location)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.transport_mode.as_str())
        .execute(&mut *tx)
        .await?;

        if req.time_mode == TimeMode::DateSelection && !req.available_dates.is_empty() {
            insert_available_dates(&mut tx, participant_id, &req.available_dates).await?;
        }

        tx.commit().await
    }

    pub async fn find_by_short_id(
        pool: &PgPool,
        short_id: &str,
    ) -> Result<Option<GatheringInfo>, sqlx::Error> {
        let gathering = sqlx::query_as::<_, Gathering>(
            r#"
            SELECT id, short_id, intent, time_mode, creator_name, creator_line_id, created_at
            FROM gatherings
            WHERE short_id = $1
            "#,
        )
        .bind(short_id)
        .fetch_optional(pool)
        .await?;

        let Some(gathering) = gathering else {
            return Ok(None);
        };

        let intent = Intent::parse(&gathering.intent)
            .ok_or_else(|| sqlx::Error::Protocol(format!("unknown intent: {}", gathering.intent)))?;
        let time_mode = TimeMode::parse(&gathering.time_mode).ok_or_else(|| {
            sqlx::Error::Protocol(format!("unknown time_mode: {}", gathering.time_mode))
        })?;

        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, gathering_id, name, line_id, location, latitude, longitude, transport_mode, is_creator
            FROM participants
            WHERE gathering_id = $1
            "#,
        )
        .bind(gathering.id)
        .fetch_all(pool)
        .await?;

        // date_selection 模式下逐个参与者取日期，保持挂载顺序
        let mut infos = Vec::with_capacity(participants.len());
        for participant in participants {
            let mut info = ParticipantInfo::try_from(participant)?;
            if time_mode == TimeMode::DateSelection {
                info.available_dates = Some(available_dates_of(pool, info.id).await?);
            }
            infos.push(info);
        }

        Ok(Some(GatheringInfo {
            short_id: gathering.short_id,
            intent,
            time_mode,
            creator_name: gathering.creator_name,
            created_at: gathering.created_at,
            participants: infos,
        }))
    }

    pub async fn join(pool: &PgPool, req: &JoinGatheringRequest) -> Result<(), sqlx::Error> {
        let gathering = sqlx::query_as::<_, Gathering>(
            r#"
            SELECT id, short_id, intent, time_mode, creator_name, creator_line_id, created_at
            FROM gatherings
            WHERE short_id = $1
            "#,
        )
        .bind(&req.short_id)
        .fetch_optional(pool)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        let time_mode = TimeMode::parse(&gathering.time_mode).ok_or_else(|| {
            sqlx::Error::Protocol(format!("unknown time_mode: {}", gathering.time_mode))
        })?;

        let mut tx = pool.begin().await?;

        let participant_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO participants (id, gathering_id, name, line_id, location, latitude, longitude, transport_mode, is_creator)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE)
            "#,
        )
        .bind(participant_id)
        .bind(gathering.id)
        .bind(&req.name)
        .bind(&req.line_id)
        .bind(&req.location)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.transport_mode.as_str())
        .execute(&mut *tx)
        .await?;

        if time_mode == TimeMode::DateSelection && !req.available_dates.is_empty() {
            insert_available_dates(&mut tx, participant_id, &req.available_dates).await?;
        }

        tx.commit().await
    }

    pub async fn time_mode_of(
        pool: &PgPool,
        short_id: &str,
    ) -> Result<Option<TimeMode>, sqlx::Error> {
        let value =
            sqlx::query_scalar::<_, String>("SELECT time_mode FROM gatherings WHERE short_id = $1")
                .bind(short_id)
                .fetch_optional(pool)
                .await?;

        match value {
            Some(s) => TimeMode::parse(&s)
                .map(Some)
                .ok_or_else(|| sqlx::Error::Protocol(format!("unknown time_mode: {}", s))),
            None => Ok(None),
        }
    }

    pub async fn common_dates(
        pool: &PgPool,
        short_id: &str,
    ) -> Result<Option<Vec<NaiveDate>>, sqlx::Error> {
        let gathering_id =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM gatherings WHERE short_id = $1")
                .bind(short_id)
                .fetch_optional(pool)
                .await?;

        let Some(gathering_id) = gathering_id else {
            return Ok(None);
        };

        let participant_ids =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM participants WHERE gathering_id = $1")
                .bind(gathering_id)
                .fetch_all(pool)
                .await?;

        // 零参与者时交集为空，不能让“计数 0 = 总数 0”放行所有日期
        if participant_ids.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let rows = sqlx::query_as::<_, (Uuid, NaiveDate)>(
            "SELECT participant_id, date_value FROM available_dates WHERE participant_id = ANY($1)",
        )
        .bind(&participant_ids)
        .fetch_all(pool)
        .await?;

        Ok(Some(intersect_dates(&rows, participant_ids.len())))
    }
}

async fn available_dates_of(
    pool: &PgPool,
    participant_id: Uuid,
) -> Result<Vec<NaiveDate>, sqlx::Error> {
    sqlx::query_scalar::<_, NaiveDate>(
        "SELECT date_value FROM available_dates WHERE participant_id = $1 ORDER BY date_value",
    )
    .bind(participant_id)
    .fetch_all(pool)
    .await
}

async fn insert_available_dates(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    participant_id: Uuid,
    dates: &[NaiveDate],
) -> Result<(), sqlx::Error> {
    for date in dates {
        sqlx::query(
            "INSERT INTO available_dates (id, participant_id, date_value) VALUES ($1, $2, $3)",
        )
        .bind(Uuid::new_v4())
        .bind(participant_id)
        .bind(*date)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn common_dates_match_worked_example() {
        let creator = Uuid::new_v4();
        let joiner = Uuid::new_v4();
        let rows = vec![
            (creator, date("2025-01-10")),
            (creator, date("2025-01-11")),
            (joiner, date("2025-01-11")),
        ];

        assert_eq!(intersect_dates(&rows, 2), vec![date("2025-01-11")]);
    }

    #[test]
    fn zero_participants_yield_no_common_dates() {
        assert!(intersect_dates(&[], 0).is_empty());
    }

    #[test]
    fn common_dates_are_sorted_ascending() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            (a, date("2025-02-03")),
            (a, date("2025-01-20")),
            (b, date("2025-02-03")),
            (b, date("2025-01-20")),
        ];

        assert_eq!(
            intersect_dates(&rows, 2),
            vec![date("2025-01-20"), date("2025-02-03")]
        );
    }

    #[test]
    fn duplicate_rows_from_one_participant_do_not_fake_agreement() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            (a, date("2025-01-10")),
            (a, date("2025-01-10")),
            (b, date("2025-01-11")),
        ];

        assert!(intersect_dates(&rows, 2).is_empty());
    }

    #[test]
    fn partial_agreement_is_not_common() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let rows = vec![
            (a, date("2025-03-01")),
            (b, date("2025-03-01")),
            (c, date("2025-03-02")),
        ];

        assert!(intersect_dates(&rows, 3).is_empty());
    }

    #[test]
    fn enum_wire_values_round_trip() {
        for intent in [Intent::Pickup, Intent::Trade, Intent::Hangout, Intent::Meetup] {
            assert_eq!(Intent::parse(intent.as_str()), Some(intent));
        }
        for mode in [TimeMode::Instant, TimeMode::DateSelection] {
            assert_eq!(TimeMode::parse(mode.as_str()), Some(mode));
        }
        for transport in [
            TransportMode::Driving,
            TransportMode::Transit,
            TransportMode::Scooter,
            TransportMode::Walking,
            TransportMode::Taxi,
        ] {
            assert_eq!(TransportMode::parse(transport.as_str()), Some(transport));
        }
        assert_eq!(Intent::parse("karaoke"), None);
        assert_eq!(TimeMode::parse(""), None);
    }

    #[test]
    fn labels_match_product_copy() {
        assert_eq!(Intent::Hangout.label(), "吃喝玩樂");
        assert_eq!(Intent::Meetup.label(), "就找個點");
        assert_eq!(TimeMode::Instant.label(), "立即聚會");
        assert_eq!(TimeMode::DateSelection.label(), "日期投票");
        assert_eq!(TransportMode::Transit.label(), "大眾運輸");
        assert_eq!(TransportMode::Taxi.label(), "計程車/Uber");
    }

    #[test]
    fn serde_uses_snake_case_wire_values() {
        assert_eq!(
            serde_json::to_string(&TimeMode::DateSelection).unwrap(),
            r#""date_selection""#
        );
        let intent: Intent = serde_json::from_str(r#""hangout""#).unwrap();
        assert_eq!(intent, Intent::Hangout);
    }

    #[test]
    fn date_strings_survive_serde_round_trip() {
        let raw = r#""2025-01-10""#;
        let parsed: NaiveDate = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&parsed).unwrap(), raw);
    }

    #[test]
    fn share_message_carries_labels_and_link() {
        let msg = share_message(
            Intent::Hangout,
            TimeMode::DateSelection,
            "https://gather.example.com/join/a1b2c3",
        );
        assert!(msg.contains("吃喝玩樂"));
        assert!(msg.contains("日期投票中"));
        assert!(msg.contains("https://gather.example.com/join/a1b2c3"));
    }
}
