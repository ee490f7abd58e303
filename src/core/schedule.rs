//! Weekly club schedules.

use crate::{
    core::access,
    errors::{Error, Result},
    models::Schedule,
    store,
};
use chrono::{NaiveTime, Utc};
use sea_orm::prelude::*;
use tracing::{info, instrument};

/// Adds a weekly slot to a club. Owner or admin only.
///
/// `day_of_week` counts from Sunday = 0, `time` is `HH:MM` and `duration` is
/// in minutes.
#[instrument(skip(db, description))]
pub async fn add_schedule(
    db: &DatabaseConnection,
    actor_id: i64,
    club_id: i64,
    day_of_week: u8,
    time: &str,
    duration: u32,
    description: &str,
) -> Result<Schedule> {
    access::require_manager(db, actor_id, club_id, "edit the schedule").await?;

    if day_of_week > 6 {
        return Err(Error::validation(format!(
            "Day of week must be 0-6, got {day_of_week}"
        )));
    }
    let time = time.trim();
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| Error::validation(format!("Time must be HH:MM, got '{time}'")))?;
    if duration == 0 {
        return Err(Error::validation("Duration must be positive"));
    }

    let schedule = store::append(db, |id| Schedule {
        id,
        club_id,
        day_of_week,
        time: parsed.format("%H:%M").to_string(),
        duration,
        description: description.trim().to_string(),
        created_at: Utc::now(),
    })
    .await?;

    info!("Added schedule {} to club {}", schedule.id, club_id);
    Ok(schedule)
}

/// Deletes a schedule slot. Owner or admin of its club only.
#[instrument(skip(db))]
pub async fn delete_schedule(
    db: &DatabaseConnection,
    actor_id: i64,
    schedule_id: i64,
) -> Result<()> {
    let mut schedules: Vec<Schedule> = store::read(db).await?;
    let club_id = schedules
        .iter()
        .find(|s| s.id == schedule_id)
        .map(|s| s.club_id)
        .ok_or_else(|| Error::not_found("schedule", schedule_id))?;
    access::require_manager(db, actor_id, club_id, "edit the schedule").await?;

    schedules.retain(|s| s.id != schedule_id);
    store::write(db, &schedules).await?;
    info!("Deleted schedule {}", schedule_id);
    Ok(())
}

/// Schedule of a club, ordered by day then time.
pub async fn list_schedules(db: &DatabaseConnection, club_id: i64) -> Result<Vec<Schedule>> {
    let mut schedules: Vec<Schedule> = store::read::<Schedule, _>(db)
        .await?
        .into_iter()
        .filter(|s| s.club_id == club_id)
        .collect();
    schedules.sort_by(|a, b| {
        a.day_of_week
            .cmp(&b.day_of_week)
            .then_with(|| a.time.cmp(&b.time))
    });
    Ok(schedules)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::ErrorKind;
    use crate::models::Role;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_add_schedule_validates_input() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;

        let bad_day = add_schedule(&db, owner.id, club.id, 7, "10:00", 60, "").await;
        assert_eq!(bad_day.unwrap_err().kind(), ErrorKind::Validation);
        let bad_time = add_schedule(&db, owner.id, club.id, 1, "25:00", 60, "").await;
        assert_eq!(bad_time.unwrap_err().kind(), ErrorKind::Validation);
        let zero = add_schedule(&db, owner.id, club.id, 1, "10:00", 0, "").await;
        assert_eq!(zero.unwrap_err().kind(), ErrorKind::Validation);

        let member = create_test_user(&db, "bob", Role::Member).await?;
        let denied = add_schedule(&db, member.id, club.id, 1, "10:00", 60, "").await;
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Authorization);

        assert!(list_schedules(&db, club.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_schedules_sorted_by_day_and_time() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        add_schedule(&db, owner.id, club.id, 3, "18:00", 60, "Evening").await?;
        add_schedule(&db, owner.id, club.id, 1, "19:30", 90, "").await?;
        add_schedule(&db, owner.id, club.id, 1, "9:05", 30, "Morning").await?;

        let slots: Vec<_> = list_schedules(&db, club.id)
            .await?
            .into_iter()
            .map(|s| (s.day_of_week, s.time))
            .collect();
        assert_eq!(
            slots,
            vec![
                (1, "09:05".to_string()),
                (1, "19:30".to_string()),
                (3, "18:00".to_string()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_schedule() -> Result<()> {
        let (db, owner, club) = setup_with_club().await?;
        let slot = add_schedule(&db, owner.id, club.id, 2, "12:00", 45, "").await?;

        delete_schedule(&db, owner.id, slot.id).await?;
        assert!(list_schedules(&db, club.id).await?.is_empty());

        let missing = delete_schedule(&db, owner.id, slot.id).await;
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);
        Ok(())
    }
}
