use crate::infra::{build_service, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use ventas300::config::AppConfig;
use ventas300::error::AppError;
use ventas300::workflows::appraisal::{
    write_commission_csv, AppraisalService, AppraisalSubmission, AppraiserCommissionEntry,
    AppraiserRegistration, CommissionPolicy, DashboardStats, MemoryStore, OwnerRegistration,
    PropertyKind, PropertyRegistration,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Read records from this directory instead of APP_DATA_DIR
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Read records from this directory instead of APP_DATA_DIR
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Destination file (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Date used for every step of the walkthrough (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Appraised value submitted for the request
    #[arg(long, default_value = "150000")]
    pub(crate) appraised_value: String,
    /// Commission percentage of the demo appraiser
    #[arg(long, default_value_t = CommissionPolicy::DEFAULT_PERCENTAGE)]
    pub(crate) commission_pct: f64,
}

/// Reporting commands read what is stored and never write the sample data.
fn reporting_config(data_dir: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if data_dir.is_some() {
        config.storage.data_dir = data_dir;
    }
    config.storage.seed_demo = false;
    Ok(config)
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let config = reporting_config(args.data_dir)?;
    let service = build_service(&config.storage)?;

    let stats = service.dashboard()?;
    let breakdown = service.commission_breakdown()?;
    render_dashboard(&stats, &breakdown);
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = reporting_config(args.data_dir)?;
    let service = build_service(&config.storage)?;
    let rows = service.commission_report()?;

    match args.output {
        Some(path) => {
            let file = File::create(&path)?;
            write_commission_csv(&rows, file)?;
            println!("Wrote {} commission rows to {}", rows.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            write_commission_csv(&rows, stdout.lock())?;
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        appraised_value,
        commission_pct,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let service = AppraisalService::new(
        Arc::new(MemoryStore::default()),
        CommissionPolicy::default(),
    );

    println!("Ventas300 appraisal demo ({today})");

    let owner = service.register_owner(
        OwnerRegistration {
            name: "Carlos Mendoza".to_string(),
            phone: "555-0123".to_string(),
            email: "carlos.mendoza@email.com".to_string(),
        },
        today,
    )?;
    println!("  Owner registered: {} ({})", owner.name, owner.id);

    let property = service.register_property(
        PropertyRegistration {
            owner_id: owner.id.clone(),
            address: "Av. Libertad 123, Col. Centro".to_string(),
            kind: PropertyKind::House,
            features: "3 habitaciones, 2 baños, piscina, jardín amplio".to_string(),
        },
        today,
    )?;
    println!(
        "  Property registered: {} [{}]",
        property.address,
        property.kind.label()
    );

    let request = service.create_request(&owner.id, &property.id, today)?;
    println!(
        "  Request opened: {} status={}",
        request.number,
        request.stage.status().label()
    );

    let appraiser = service.register_appraiser(AppraiserRegistration {
        name: "Ana Torres".to_string(),
        phone: "555-1001".to_string(),
        email: "ana.torres@ventas300.com".to_string(),
        specialty: "Residencial".to_string(),
        available: true,
        commission_percentage: Some(commission_pct),
    })?;
    let assigned = service.assign_appraiser(&request.id, &appraiser.id, today)?;
    println!(
        "  Assigned {} ({}% commission) status={}",
        appraiser.name,
        appraiser.commission_percentage,
        assigned.stage.status().label()
    );

    let submission = AppraisalSubmission {
        observations: "Casa bien conservada, cocina remodelada recientemente.".to_string(),
        appraised_value,
        photos: vec!["foto1.jpg".to_string(), "foto2.jpg".to_string()],
    };
    let appraisal = service.record_appraisal(&request.id, submission.clone(), today)?;
    println!(
        "  Appraisal recorded: value {:.2} commission {:.2}",
        appraisal.appraised_value, appraisal.commission
    );

    match service.record_appraisal(&request.id, submission, today) {
        Ok(_) => println!("  Unexpected: second appraisal accepted"),
        Err(err) => println!("  Second appraisal rejected: {err}"),
    }

    println!();
    let stats = service.dashboard()?;
    let breakdown = service.commission_breakdown()?;
    render_dashboard(&stats, &breakdown);
    Ok(())
}

fn render_dashboard(stats: &DashboardStats, breakdown: &[AppraiserCommissionEntry]) {
    println!("Dashboard");
    println!("  Total requests: {}", stats.total_requests);
    for entry in stats.status_counts() {
        println!("  - {:<10} {}", entry.status_label, entry.count);
    }
    println!("  Appraised value: {:.2}", stats.total_appraised_value);
    println!("  Commissions: {:.2}", stats.total_commissions);

    if breakdown.is_empty() {
        println!("\nCommissions by appraiser: none recorded");
        return;
    }
    println!("\nCommissions by appraiser");
    for entry in breakdown {
        println!(
            "  - {} | appraisals={} | value={:.2} | commission={:.2}",
            entry.appraiser_name,
            entry.appraisals,
            entry.total_appraised_value,
            entry.total_commission
        );
    }
}
