// src/emotions.rs
//! Emotion questionnaire: fixed questions, lenient answer casting and the
//! stored check-in history.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use graflog::app_log;

pub const MIN_ANSWER: u8 = 1;
pub const MAX_ANSWER: u8 = 5;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Question {
    pub key: &'static str,
    pub prompt: &'static str,
    /// Higher answers mean a worse mood.
    pub inverted: bool,
}

pub const QUESTIONS: [Question; 5] = [
    Question {
        key: "confidence",
        prompt: "How confident do you feel about your job search?",
        inverted: false,
    },
    Question {
        key: "stress",
        prompt: "How stressed do you feel right now?",
        inverted: true,
    },
    Question {
        key: "motivation",
        prompt: "How motivated are you to keep applying?",
        inverted: false,
    },
    Question {
        key: "rejection_impact",
        prompt: "How much have recent rejections affected you?",
        inverted: true,
    },
    Question {
        key: "optimism",
        prompt: "How optimistic are you about the coming weeks?",
        inverted: false,
    },
];

/// Accepts integers, integral floats and numeric strings within 1..=5.
pub fn cast_answer(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if number.fract() != 0.0 {
        return None;
    }
    let answer = number as i64;
    (i64::from(MIN_ANSWER)..=i64::from(MAX_ANSWER))
        .contains(&answer)
        .then_some(answer as u8)
}

/// Every question must be answered; unknown keys are ignored.
pub fn validate_answers(raw: &HashMap<String, Value>) -> Result<BTreeMap<String, u8>> {
    let mut answers = BTreeMap::new();
    for question in QUESTIONS.iter() {
        let value = raw
            .get(question.key)
            .with_context(|| format!("Missing answer for '{}'", question.key))?;
        let answer = cast_answer(value).with_context(|| {
            format!(
                "Answer for '{}' must be a whole number between {} and {}",
                question.key, MIN_ANSWER, MAX_ANSWER
            )
        })?;
        answers.insert(question.key.to_string(), answer);
    }
    Ok(answers)
}

/// Mean answer with inverted questions flipped (6 - x), two decimals.
pub fn mood_score(answers: &BTreeMap<String, u8>) -> f64 {
    let scores: Vec<f64> = QUESTIONS
        .iter()
        .filter_map(|q| {
            answers.get(q.key).map(|a| {
                if q.inverted {
                    f64::from(MAX_ANSWER + 1 - a)
                } else {
                    f64::from(*a)
                }
            })
        })
        .collect();

    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmotionSubmission {
    pub answers: HashMap<String, Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionEntry {
    pub id: String,
    pub answers: BTreeMap<String, u8>,
    pub mood_score: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct EmotionRow {
    id: String,
    answers: String,
    mood_score: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl EmotionRow {
    /// Rows written by older clients may hold strings or out-of-range
    /// values; those answers are dropped rather than failing the listing.
    fn into_entry(self) -> EmotionEntry {
        let raw: HashMap<String, Value> = serde_json::from_str(&self.answers).unwrap_or_else(|e| {
            app_log!(warn, "Unreadable answers in emotion entry {}: {}", self.id, e);
            HashMap::new()
        });
        let answers = raw
            .iter()
            .filter_map(|(key, value)| cast_answer(value).map(|a| (key.clone(), a)))
            .collect();

        EmotionEntry {
            id: self.id,
            answers,
            mood_score: self.mood_score,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

pub struct EmotionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EmotionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, user_id: &str, submission: EmotionSubmission) -> Result<EmotionEntry> {
        let answers = validate_answers(&submission.answers)?;
        let entry = EmotionEntry {
            id: Uuid::new_v4().to_string(),
            mood_score: mood_score(&answers),
            answers,
            notes: submission
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO user_emotions (id, user_id, answers, mood_score, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(user_id)
        .bind(serde_json::to_string(&entry.answers)?)
        .bind(entry.mood_score)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .execute(self.pool)
        .await
        .context("Failed to store emotion entry")?;

        app_log!(info, "Recorded emotion check-in {} (mood {:.2})", entry.id, entry.mood_score);
        Ok(entry)
    }

    /// Newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<EmotionEntry>> {
        let rows = sqlx::query_as::<_, EmotionRow>(
            r#"
            SELECT id, answers, mood_score, notes, created_at
            FROM user_emotions
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(EmotionRow::into_entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lenient_casting() {
        assert_eq!(cast_answer(&json!(3)), Some(3));
        assert_eq!(cast_answer(&json!(4.0)), Some(4));
        assert_eq!(cast_answer(&json!(" 5 ")), Some(5));
        assert_eq!(cast_answer(&json!(2.5)), None);
        assert_eq!(cast_answer(&json!(0)), None);
        assert_eq!(cast_answer(&json!("6")), None);
        assert_eq!(cast_answer(&json!(true)), None);
        assert_eq!(cast_answer(&json!(null)), None);
    }

    #[test]
    fn test_mood_score_inverts_negative_questions() {
        let answers = validate_answers(&raw(json!({
            "confidence": 4,
            "stress": "2",
            "motivation": 5,
            "rejection_impact": 1,
            "optimism": 3,
            "extra": "ignored"
        })))
        .unwrap();
        // (4 + 4 + 5 + 5 + 3) / 5
        assert_eq!(mood_score(&answers), 4.2);
    }

    #[test]
    fn test_missing_answer_is_rejected() {
        let err = validate_answers(&raw(json!({ "confidence": 4 }))).unwrap_err();
        assert!(err.to_string().contains("stress"));
    }

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let db = Database::in_memory().await.unwrap();
        let repo = EmotionRepository::new(db.pool());
        let answers = json!({
            "confidence": 3, "stress": 3, "motivation": 3,
            "rejection_impact": 3, "optimism": 3
        });

        let first = repo
            .record(
                "alice",
                EmotionSubmission {
                    answers: raw(answers.clone()),
                    notes: Some("  ".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(first.notes.is_none());
        assert_eq!(first.mood_score, 3.0);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo
            .record(
                "alice",
                EmotionSubmission {
                    answers: raw(answers),
                    notes: Some("Good interview today".to_string()),
                },
            )
            .await
            .unwrap();

        let entries = repo.list_for_user("alice").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].answers.len(), QUESTIONS.len());
        assert!(repo.list_for_user("bob").await.unwrap().is_empty());
    }
}
