use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use rental_ops::config::AppConfig;
use rental_ops::error::AppError;
use rental_ops::workflows::cleanings::{CleaningAssignment, CleaningId, CleaningStatus};
use rental_ops::workflows::import::{ImportReport, SnapshotImporter};
use rental_ops::workflows::turnover::{
    default_target_date, position_fraction, position_percent, Apartment, ApartmentId,
    CleaningPolicy, ClockTime, DashboardSummary, Reservation, ReservationId, ReservationStatus,
    Snapshot, TurnoverService,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Dashboard date (YYYY-MM-DD). Defaults to tomorrow.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Also list open cleanings for this assignee.
    #[arg(long)]
    pub(crate) assignee: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct TurnoverReportArgs {
    /// Apartment inventory CSV export
    #[arg(long)]
    pub(crate) apartments: PathBuf,
    /// Reservation CSV export
    #[arg(long)]
    pub(crate) reservations: PathBuf,
    /// Optional cleaning assignment CSV export
    #[arg(long)]
    pub(crate) cleanings: Option<PathBuf>,
    /// Dashboard date (YYYY-MM-DD). Defaults to tomorrow.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// List open cleanings for this assignee after the dashboard
    #[arg(long)]
    pub(crate) assignee: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct PositionArgs {
    /// Clock times (HH:MM)
    #[arg(required = true)]
    pub(crate) times: Vec<String>,
}

pub(crate) fn run_position(args: PositionArgs) -> Result<(), AppError> {
    for raw in &args.times {
        match ClockTime::parse(raw) {
            Ok(time) => println!(
                "{}  {:.6}  {:.2}%",
                time,
                position_fraction(time),
                position_percent(time)
            ),
            Err(error) => println!("{}  {}", raw.trim(), error),
        }
    }
    Ok(())
}

pub(crate) fn run_turnover_report(args: TurnoverReportArgs) -> Result<(), AppError> {
    let TurnoverReportArgs {
        apartments,
        reservations,
        cleanings,
        date,
        assignee,
    } = args;

    let policy = AppConfig::load()?.scheduling.policy;
    let (snapshot, import) =
        SnapshotImporter::from_paths(apartments.as_path(), reservations.as_path(), cleanings.as_deref())?;
    let date = date.unwrap_or_else(|| default_target_date(Local::now().date_naive()));

    render_import(&import);
    render(snapshot, policy, date, assignee.as_deref())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { date, assignee } = args;
    let date = date.unwrap_or_else(|| default_target_date(Local::now().date_naive()));

    println!("Turnover timeline demo (sample snapshot)");
    let assignee = assignee.unwrap_or_else(|| "maria".to_string());
    render(sample_snapshot(date), CleaningPolicy::default(), date, Some(assignee.as_str()))
}

fn render(
    snapshot: Snapshot,
    policy: CleaningPolicy,
    date: NaiveDate,
    assignee: Option<&str>,
) -> Result<(), AppError> {
    let service = TurnoverService::new(Arc::new(snapshot), policy);
    let dashboard = service.dashboard(date)?;
    render_dashboard(&dashboard.summary(), &policy);

    if let Some(assignee) = assignee {
        let assignments = service.cleanings_for(assignee, &CleaningStatus::OPEN)?;
        render_cleanings(assignee, &assignments);
    }

    Ok(())
}

fn render_import(report: &ImportReport) {
    println!(
        "Imported {} apartments, {} reservations, {} cleanings",
        report.apartments, report.reservations, report.cleanings
    );
    for rejected in &report.rejected {
        println!(
            "  ! skipped {} row {}: {}",
            rejected.source, rejected.row, rejected.reason
        );
    }
}

pub(crate) fn render_dashboard(summary: &DashboardSummary, policy: &CleaningPolicy) {
    println!("\nCheckout timeline for {}", summary.date);
    println!(
        "Policy: checkout {} | check-in {} | critical under {} min",
        policy.checkout_default, policy.checkin_default, policy.critical_threshold_minutes
    );
    println!(
        "- {} checkouts | {} normal | {} critical | {} invalid",
        summary.checkouts, summary.normal, summary.critical, summary.invalid
    );
    println!(
        "- {} late checkouts | {} early check-ins",
        summary.late_checkouts, summary.early_checkins
    );

    if summary.rows.is_empty() && summary.failures.is_empty() {
        println!("No departures scheduled.");
        return;
    }

    for row in &summary.rows {
        let mut flags = Vec::new();
        if row.is_late_checkout {
            flags.push("late checkout");
        }
        if row.is_early_checkin {
            flags.push("early check-in");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        let next_guest = row
            .checkin_guest
            .as_deref()
            .or(row.checkin_reservation.as_ref().map(|id| id.0.as_str()))
            .unwrap_or("no arrival");

        println!(
            "  - {}: {} -> {} ({}) {}{}",
            row.apartment_name,
            row.checkout_time,
            row.checkin_time,
            row.duration_formatted,
            row.status_label,
            flags
        );
        println!(
            "      out {} @ {:.1}% | in {} @ {:.1}%",
            row.checkout_guest
                .as_deref()
                .unwrap_or(row.checkout_reservation.0.as_str()),
            row.markers.checkout_percent,
            next_guest,
            row.markers.checkin_percent
        );
        for warning in &row.warnings {
            println!("      warning: {}", warning);
        }
    }

    if !summary.failures.is_empty() {
        println!("Unscheduled departures:");
        for failure in &summary.failures {
            println!(
                "  - {} ({}): {}",
                failure.apartment_name, failure.checkout_reservation, failure.detail
            );
            for warning in &failure.warnings {
                println!("      warning: {}", warning);
            }
        }
    }

    if summary.needs_attention() {
        println!("Attention required before dispatching cleaners.");
    }
}

fn render_cleanings(assignee: &str, assignments: &[CleaningAssignment]) {
    println!("\nOpen cleanings for {}", assignee);
    if assignments.is_empty() {
        println!("  (none)");
        return;
    }
    for assignment in assignments {
        println!(
            "  - {} {} [{}]",
            assignment.scheduled_start.format("%Y-%m-%d %H:%M"),
            assignment.apartment_id,
            assignment.status.label()
        );
    }
}

/// Three apartments turning over on `date`: a comfortable gap, a squeezed one
/// and a double-booked arrival.
pub(crate) fn sample_snapshot(date: NaiveDate) -> Snapshot {
    let apartment = |id: &str, name: &str| Apartment {
        id: ApartmentId(id.to_string()),
        name: name.to_string(),
        active: true,
    };
    let stay = |id: &str, apt: &str, guest: &str, check_in: NaiveDate, check_out: NaiveDate| {
        Reservation {
            id: ReservationId(id.to_string()),
            apartment_id: ApartmentId(apt.to_string()),
            guest_name: Some(guest.to_string()),
            check_in_date: check_in,
            check_out_date: check_out,
            planned_arrival_time: None,
            planned_checkout_time: None,
            status: ReservationStatus::Active,
            created_at: None,
        }
    };
    let at = |hour: u32, minute: u32| -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default())
    };

    let mut harbor_out = stay("r-100", "apt-1", "Ana Ruiz", date - Duration::days(3), date);
    harbor_out.planned_checkout_time = Some("10:30".to_string());
    let mut harbor_in = stay("r-101", "apt-1", "Ben Okafor", date, date + Duration::days(4));
    harbor_in.planned_arrival_time = Some("15:00".to_string());

    let mut loft_out = stay("r-200", "apt-2", "Chen Wei", date - Duration::days(2), date);
    loft_out.planned_checkout_time = Some("12:30".to_string());
    let mut loft_in = stay("r-201", "apt-2", "Dana Levi", date, date + Duration::days(2));
    loft_in.planned_arrival_time = Some("13:15".to_string());

    let garden_out = stay("r-300", "apt-3", "Eli Moss", date - Duration::days(5), date);
    let mut garden_in = stay("r-301", "apt-3", "Fay Dunn", date, date + Duration::days(1));
    garden_in.planned_arrival_time = Some("16:00".to_string());
    garden_in.created_at = Some(at(0, 0) - Duration::days(20));
    let mut garden_dup = stay("r-302", "apt-3", "Gus Hale", date, date + Duration::days(3));
    garden_dup.created_at = Some(at(0, 0) - Duration::days(10));

    let cleaning = |id: &str, apt: &str, assignee: &str, start: NaiveDateTime| CleaningAssignment {
        id: CleaningId(id.to_string()),
        apartment_id: ApartmentId(apt.to_string()),
        assignee: assignee.to_string(),
        status: CleaningStatus::Scheduled,
        scheduled_start: start,
        notes: None,
    };

    Snapshot {
        apartments: vec![
            apartment("apt-1", "Harbor View"),
            apartment("apt-2", "Canal Loft"),
            apartment("apt-3", "Garden Suite"),
        ],
        reservations: vec![
            harbor_out, harbor_in, loft_out, loft_in, garden_out, garden_in, garden_dup,
        ],
        cleanings: vec![
            cleaning("c-1", "apt-2", "maria", at(12, 30)),
            cleaning("c-2", "apt-1", "maria", at(10, 30)),
            cleaning("c-3", "apt-3", "jon", at(11, 0)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_ops::workflows::turnover::{TurnoverError, WindowStatus};

    #[test]
    fn sample_snapshot_covers_each_window_kind() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 12).expect("valid date");
        let service = TurnoverService::new(Arc::new(sample_snapshot(date)), CleaningPolicy::default());
        let dashboard = service.dashboard(date).expect("sample snapshot loads");

        let names: Vec<&str> = dashboard
            .apartments
            .iter()
            .map(|entry| entry.apartment.name.as_str())
            .collect();
        assert_eq!(names, vec!["Canal Loft", "Garden Suite", "Harbor View"]);

        let loft = &dashboard.apartments[0];
        assert_eq!(loft.cleaning_window.status, WindowStatus::Critical);
        assert!(loft.is_late_checkout);

        let garden = &dashboard.apartments[1];
        assert_eq!(
            garden.checkin_reservation.as_ref().map(|r| r.id.0.as_str()),
            Some("r-301")
        );
        assert!(matches!(
            garden.warnings.as_slice(),
            [TurnoverError::AmbiguousSchedule { .. }]
        ));

        let harbor = &dashboard.apartments[2];
        assert_eq!(harbor.cleaning_window.duration_minutes, 270);
        assert_eq!(harbor.cleaning_window.status, WindowStatus::Normal);
    }

    #[test]
    fn sample_cleanings_are_listed_in_start_order() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 12).expect("valid date");
        let service = TurnoverService::new(Arc::new(sample_snapshot(date)), CleaningPolicy::default());
        let ids: Vec<String> = service
            .cleanings_for("maria", &CleaningStatus::OPEN)
            .expect("cleanings load")
            .into_iter()
            .map(|assignment| assignment.id.0)
            .collect();
        assert_eq!(ids, vec!["c-2", "c-1"]);
    }
}
