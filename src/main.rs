/// Command-line interface for the doctor schedule editor.
///
/// Lets a doctor browse weeks, edit one day at a time and save the week
/// to the clinic backend.

use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::Weekday;
use clinic_schedule::config::ClientConfig;
use clinic_schedule::models::{weekday_key, WEEKDAYS};
use clinic_schedule::rules;
use clinic_schedule::time_utils::{business_hour_options, parse_any};
use clinic_schedule::{
    Clock, HttpScheduleStore, RemoteFailure, ScheduleError, ScheduleManager, ScheduleStore,
    SlotField, SlotKind, StaticToken, SystemClock,
};
use tracing_subscriber::EnvFilter;

struct ScheduleCLI<S: ScheduleStore, C: Clock, R> {
    manager: ScheduleManager<S, C>,
    input: RefCell<R>,
    /// Set once the input reaches end of file or fails.
    closed: Cell<bool>,
    running: bool,
}

impl<S: ScheduleStore, C: Clock, R: BufRead> ScheduleCLI<S, C, R> {
    fn new(manager: ScheduleManager<S, C>, input: R) -> Self {
        ScheduleCLI {
            manager,
            input: RefCell::new(input),
            closed: Cell::new(false),
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       DOCTOR WEEKLY SCHEDULE");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. View week");
        println!("2. Previous week");
        println!("3. Next week");
        println!("4. Current week");
        println!("5. Edit a day");
        println!("6. Save schedule");
        println!("7. Exit");
        println!("{}", "-".repeat(20));
    }

    fn get_input(&self, prompt: &str, default: Option<&str>) -> String {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        io::stdout().flush().ok();

        let mut input = String::new();
        match self.input.borrow_mut().read_line(&mut input) {
            Ok(0) | Err(_) => {
                self.closed.set(true);
                println!();
                return default.unwrap_or("").to_string();
            }
            Ok(_) => {}
        }
        let input = input.trim();

        if input.is_empty() {
            default.unwrap_or("").to_string()
        } else {
            input.to_string()
        }
    }

    fn get_int_input(&self, prompt: &str, default: Option<i32>) -> i32 {
        loop {
            let default_str = default.map(|d| d.to_string());
            let input = self.get_input(prompt, default_str.as_deref());

            if let Ok(value) = input.parse::<i32>() {
                return value;
            }
            if self.closed.get() {
                return default.unwrap_or(0);
            }
            println!("Please enter a valid number");
        }
    }

    fn report_remote(&self, error: &RemoteFailure) {
        match error {
            RemoteFailure::AuthExpired => {
                println!("\nYour session has expired. Please log in again (set CLINIC_API_TOKEN).")
            }
            other => println!("\nError: {}", other),
        }
    }

    fn report(&self, error: &ScheduleError) {
        match error {
            ScheduleError::Remote(remote) => self.report_remote(remote),
            other => println!("\nError: {}", other),
        }
    }

    fn load(&self, result: std::result::Result<(), RemoteFailure>) {
        if let Err(error) = result {
            self.report_remote(&error);
            println!("Showing an empty week.");
        }
        self.view_week();
    }

    /// Ask before throwing away committed but unsaved days.
    fn confirm_discard(&self) -> bool {
        if !self.manager.has_unsaved_changes() {
            return true;
        }
        let answer = self.get_input("Discard unsaved changes? (y/n)", Some("n"));
        answer.eq_ignore_ascii_case("y")
    }

    /// Move to another week, or back to the current one with `None`.
    fn change_week(&mut self, delta_weeks: Option<i64>) {
        if !self.confirm_discard() {
            return;
        }
        let result = match delta_weeks {
            Some(delta) => self.manager.show_week(delta).map(|_| ()),
            None => self.manager.show_current_week().map(|_| ()),
        };
        self.load(result);
    }

    fn view_week(&self) {
        let navigator = self.manager.navigator();
        let schedule = self.manager.schedule();

        println!("\n--- Week of {} ---", navigator.label());
        if let Some(error) = self.manager.load_error() {
            println!("  (could not load schedule: {})", error);
        }

        for (day, date) in WEEKDAYS.iter().zip(navigator.window()) {
            let day_schedule = schedule.day(*day);
            let mut flags = Vec::new();
            if self.manager.is_unsaved(*day) {
                flags.push("unsaved");
            }
            if !self.manager.is_editable(*day) {
                flags.push("locked");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" ({})", flags.join(", "))
            };

            println!("\n{}{}:", date.format("%A, %Y-%m-%d"), flags);
            if *day == Weekday::Sun && day_schedule.is_empty() {
                println!("  Clinic closed");
                continue;
            }
            if day_schedule.is_empty() {
                println!("  No slots");
                continue;
            }
            for slot in day_schedule.slots() {
                match (slot.kind, slot.start_time, slot.end_time) {
                    (SlotKind::Available, Some(start), Some(end)) => {
                        println!("  {} - {}", start.to_12_hour(), end.to_12_hour())
                    }
                    _ => println!("  {}", slot.kind.name()),
                }
            }
        }

        println!("\nTotal hours: {:.2}", self.manager.total_hours());
        if self.manager.has_unsaved_changes() {
            println!("You have unsaved changes. Choose 'Save schedule' to keep them.");
        }
    }

    fn choose_day(&self) -> Option<Weekday> {
        println!();
        for (i, day) in WEEKDAYS.iter().enumerate() {
            println!("  {}. {}", i + 1, weekday_key(*day));
        }
        let choice = self.get_int_input("Select day (0 to go back)", Some(0));
        if choice < 1 || choice as usize > WEEKDAYS.len() {
            return None;
        }
        Some(WEEKDAYS[choice as usize - 1])
    }

    fn choose_time(&self, prompt: &str, current: &str, options: &[String]) -> String {
        println!("\n{}:", prompt);
        for (i, option) in options.iter().enumerate() {
            println!("  {:2}. {}", i + 1, option);
        }
        let choice = self.get_int_input("Select time (0 to keep current)", Some(0));
        if choice >= 1 && (choice as usize) <= options.len() {
            options[choice as usize - 1].clone()
        } else {
            current.to_string()
        }
    }

    fn print_draft(&self) {
        let Some(session) = self.manager.session() else {
            return;
        };

        println!(
            "\n--- Editing {} ({}) ---",
            weekday_key(session.day),
            session.date.format("%Y-%m-%d")
        );
        if session.slots.is_empty() {
            println!("  No slots");
        }
        for (i, slot) in session.slots.iter().enumerate() {
            let saved = if slot.id.is_some() { " [saved]" } else { "" };
            match slot.kind {
                SlotKind::DayOff => println!("  {}. Day Off{}", i + 1, saved),
                SlotKind::Available => println!(
                    "  {}. {} - {}{}",
                    i + 1,
                    display_or_blank(&slot.start_time),
                    display_or_blank(&slot.end_time),
                    saved
                ),
            }
        }
    }

    fn pick_slot(&self) -> Option<uuid::Uuid> {
        let session = self.manager.session()?;
        let choice = self.get_int_input("Select slot (0 to go back)", Some(0));
        if choice < 1 || choice as usize > session.slots.len() {
            return None;
        }
        Some(session.slots[choice as usize - 1].key)
    }

    fn change_slot_times(&mut self) {
        let Some(key) = self.pick_slot() else {
            return;
        };
        let Some(slot) = self
            .manager
            .session()
            .and_then(|s| s.slots.iter().find(|slot| slot.key == key))
            .cloned()
        else {
            return;
        };

        let starts: Vec<String> = self
            .manager
            .start_options()
            .iter()
            .map(|t| t.to_12_hour())
            .collect();
        let starts = if starts.is_empty() {
            business_hour_options()
        } else {
            starts
        };
        let start = self.choose_time("Start time", &slot.start_time, &starts);

        let ends: Vec<String> = match parse_any(&start) {
            Some(start) => rules::end_options(start).iter().map(|t| t.to_12_hour()).collect(),
            None => business_hour_options(),
        };
        let end = self.choose_time("End time", &slot.end_time, &ends);

        let updates = [(SlotField::StartTime, start), (SlotField::EndTime, end)];
        for (field, value) in updates {
            if let Err(error) = self.manager.update_draft_slot(key, field, &value) {
                self.report(&error);
                return;
            }
        }
    }

    fn edit_day(&mut self) {
        let Some(day) = self.choose_day() else {
            return;
        };
        if let Err(error) = self.manager.open_day_for_edit(day) {
            self.report(&error);
            return;
        }

        while self.manager.session().is_some() {
            self.print_draft();
            println!("\n  1. Add slot");
            println!("  2. Change slot times");
            println!("  3. Remove slot");
            println!("  4. Mark day off");
            println!("  5. Save day");
            println!("  6. Cancel");

            let choice = self.get_int_input("Enter choice", Some(5));
            if self.closed.get() {
                self.manager.cancel_edit();
                break;
            }

            let result = match choice {
                1 => self.manager.add_draft_slot().map(|_| ()),
                2 => {
                    self.change_slot_times();
                    Ok(())
                }
                3 => match self.pick_slot() {
                    Some(key) => self.manager.remove_draft_slot(key),
                    None => Ok(()),
                },
                4 => self.manager.mark_day_off(),
                5 => self.manager.commit_day().map(|_| {
                    println!("\nDay updated. Remember to save the schedule.");
                }),
                6 => {
                    self.manager.cancel_edit();
                    Ok(())
                }
                _ => {
                    println!("Invalid choice");
                    Ok(())
                }
            };

            if let Err(error) = result {
                self.report(&error);
            }
        }
    }

    fn save_schedule(&mut self) {
        match self.manager.save_week() {
            Ok(schedule) => println!(
                "\nSchedule saved. Total hours: {:.2}",
                schedule.total_hours()
            ),
            Err(error) => self.report(&error),
        }
    }

    fn run(&mut self) {
        self.print_header();
        let result = self.manager.show_current_week().map(|_| ());
        self.load(result);

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Enter choice", Some(1));
            if self.closed.get() {
                if self.manager.has_unsaved_changes() {
                    println!("Input closed; unsaved changes were not saved.");
                }
                self.running = false;
                break;
            }

            match choice {
                1 => self.view_week(),
                2 => self.change_week(Some(-1)),
                3 => self.change_week(Some(1)),
                4 => self.change_week(None),
                5 => self.edit_day(),
                6 => self.save_schedule(),
                7 => {
                    if !self.confirm_discard() {
                        continue;
                    }
                    self.running = false;
                    println!("\nGoodbye!");
                }
                _ => println!("Invalid choice"),
            }
        }
    }
}

fn display_or_blank(value: &str) -> &str {
    if value.trim().is_empty() {
        "--:--"
    } else {
        value
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = ClientConfig::from_env().context("invalid client configuration")?;
    let store = HttpScheduleStore::new(
        config.api_url.clone(),
        config.http_timeout,
        StaticToken(config.api_token.clone()),
    )
    .context("failed to build http client")?;

    let mut cli = ScheduleCLI::new(ScheduleManager::new(store, SystemClock), io::stdin().lock());
    cli.run();
    Ok(())
}
