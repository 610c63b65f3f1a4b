use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use futures::join;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;
use shared_scheduling::{
    classify, generate_slots, is_working_day, BusyInterval, SlotStatus, TimeSlot, MINUTES_PER_DAY,
};

use crate::models::{DayAvailability, Dentist, DentistError, SlotView};
use crate::services::blocked::minutes_of;
use crate::services::work_info::WorkInfoService;

/// Minimal projections of the busy rows this service reads. Appointment
/// lifecycle lives in its own cell; availability only needs the interval,
/// the booking patient and whether the row still counts.
#[derive(Debug, Deserialize)]
struct AppointmentRow {
    time_from: NaiveTime,
    time_to: NaiveTime,
    patient_id: Option<Uuid>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct BlockedRow {
    time_from: NaiveTime,
    time_to: NaiveTime,
}

pub struct AvailabilityService {
    db: PostgrestClient,
    work_info: WorkInfoService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            work_info: WorkInfoService::new(config),
        }
    }

    /// Computes the classified slot list for one dentist and date.
    ///
    /// `now_minutes` is the caller's clock when the target date is today,
    /// `None` otherwise; past-slot exclusion only applies to today.
    /// If fetching the busy calendar fails the day is returned fully
    /// available rather than erroring: showing a bookable slot that later
    /// 409s beats showing an empty day, and the booking guard still holds
    /// the line.
    pub async fn day_availability(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
        viewer: Option<Uuid>,
        now_minutes: Option<u32>,
        auth_token: &str,
    ) -> Result<DayAvailability, DentistError> {
        let dentist = self.work_info.get_dentist(dentist_id, auth_token).await?;
        let hours = dentist.working_hours()?;

        if !is_working_day(date, hours.days_from, hours.days_to) {
            return Ok(DayAvailability {
                dentist_id,
                date,
                working_day: false,
                slot_minutes: hours.slot_minutes,
                slots: Vec::new(),
            });
        }

        // Slots reaching past midnight belong to the following date and
        // cannot be booked under this one, so they are not advertised here.
        // A slot ending exactly at midnight stays: booking reads its 00:00
        // end as end-of-day.
        let slots: Vec<TimeSlot> = generate_slots(&hours)
            .into_iter()
            .filter(|s| s.end_minutes <= MINUTES_PER_DAY)
            .collect();

        let (appointments, blocked) = join!(
            self.fetch_appointments(&dentist, date, auth_token),
            self.fetch_blocked(&dentist, date, auth_token)
        );

        let busy = match (appointments, blocked) {
            (Ok(appointments), Ok(blocked)) => {
                let mut busy: Vec<BusyInterval> = appointments
                    .into_iter()
                    .filter(|a| a.status != "cancelled")
                    .map(|a| {
                        BusyInterval::from_range(
                            minutes_of(a.time_from),
                            minutes_of(a.time_to),
                            a.patient_id,
                        )
                    })
                    .collect();
                busy.extend(blocked.into_iter().map(|b| {
                    BusyInterval::from_range(minutes_of(b.time_from), minutes_of(b.time_to), None)
                }));
                busy
            }
            (appointments, blocked) => {
                if let Err(e) = appointments {
                    warn!("Failed to fetch appointments for {}: {}", dentist_id, e);
                }
                if let Err(e) = blocked {
                    warn!("Failed to fetch blocked ranges for {}: {}", dentist_id, e);
                }
                // Fail open: the whole day shows as available.
                let slots = slots
                    .iter()
                    .map(|s| SlotView {
                        time_from: s.label_from(),
                        time_to: s.label_to(),
                        status: SlotStatus::Available,
                    })
                    .collect();
                return Ok(DayAvailability {
                    dentist_id,
                    date,
                    working_day: true,
                    slot_minutes: hours.slot_minutes,
                    slots,
                });
            }
        };

        debug!(
            "Classifying {} slots against {} busy intervals for dentist {}",
            slots.len(),
            busy.len(),
            dentist_id
        );

        let slots = slots
            .iter()
            .map(|s| SlotView {
                time_from: s.label_from(),
                time_to: s.label_to(),
                status: classify(s, &busy, viewer, now_minutes),
            })
            .collect();

        Ok(DayAvailability {
            dentist_id,
            date,
            working_day: true,
            slot_minutes: hours.slot_minutes,
            slots,
        })
    }

    async fn fetch_appointments(
        &self,
        dentist: &Dentist,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<AppointmentRow>> {
        let path = format!(
            "/rest/v1/appointments?dentist_id=eq.{}&date=eq.{}",
            dentist.dentist_id, date
        );
        self.db.request(Method::GET, &path, Some(auth_token), None).await
    }

    async fn fetch_blocked(
        &self,
        dentist: &Dentist,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<BlockedRow>> {
        let path = format!(
            "/rest/v1/blocked_dates?dentist_id=eq.{}&date=eq.{}",
            dentist.dentist_id, date
        );
        self.db.request(Method::GET, &path, Some(auth_token), None).await
    }
}
