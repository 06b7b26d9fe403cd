use chrono::Utc;
use log::{ error, info };
use std::error::Error;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines };

use crate::models::travel::{ parse_trip_date, Interests, TripRequest, INTEREST_OPTIONS, MAX_INTERESTS };
use crate::planner::{ PlannerState, TripPlanner };
use crate::render;

const HELP: &str = "Commands:
  /new        start over with a new trip
  /book N     show the booking link for flight option N
  /flights    show the flight options again
  /plan       show the travel plan again
  /chat       show the conversation so far
  /keys       update your API keys
  /quit       exit
Anything else is sent as a follow-up question about your plan.";

type SessionResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Line-oriented front end for a `TripPlanner`.
pub struct Session<'a, R, W> {
    planner: &'a mut TripPlanner,
    lines: Lines<R>,
    out: W,
}

enum Step {
    Keys,
    Trip,
    Result,
    Stop,
}

enum FormOutcome {
    Submitted(TripRequest),
    Restart,
    Quit,
}

impl<'a, R, W> Session<'a, R, W> where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin {
    pub fn new(planner: &'a mut TripPlanner, reader: R, writer: W) -> Self {
        Self { planner, lines: reader.lines(), out: writer }
    }

    async fn write(&mut self, text: &str) -> SessionResult<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn writeln(&mut self, text: &str) -> SessionResult<()> {
        self.write(text).await?;
        self.write("\n").await
    }

    /// None means the input ended.
    async fn prompt(&mut self, label: &str) -> SessionResult<Option<String>> {
        self.write(label).await?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    async fn flush_notices(&mut self) -> SessionResult<()> {
        for notice in self.planner.take_notices() {
            let line = render::render_notice(&notice);
            self.writeln(&line).await?;
        }
        Ok(())
    }

    pub async fn run(&mut self) -> SessionResult<()> {
        self.writeln("Wanderlust AI: Your AI Travel Planner\n").await?;
        loop {
            self.flush_notices().await?;
            let step = match self.planner.state() {
                PlannerState::AwaitingCredentials => Step::Keys,
                PlannerState::AwaitingTripInput => Step::Trip,
                PlannerState::DisplayingResult(_) => Step::Result,
                other => {
                    error!("Session resumed in transient state: {}", other.label());
                    Step::Stop
                }
            };
            let keep_going = match step {
                Step::Keys => self.collect_keys().await?,
                Step::Trip => self.collect_trip().await?,
                Step::Result => self.result_view().await?,
                Step::Stop => false,
            };
            if !keep_going {
                self.flush_notices().await?;
                info!("Session ended");
                return Ok(());
            }
        }
    }

    async fn collect_keys(&mut self) -> SessionResult<bool> {
        self.writeln(
            "Your API keys are stored locally and only sent to Google and SerpAPI.\nGet a Gemini key at https://ai.google.dev/ and a SerpAPI key at https://serpapi.com/"
        ).await?;
        let gemini = match self.prompt("Gemini API Key (Required): ").await? {
            Some(key) => key,
            None => {
                return Ok(false);
            }
        };
        if gemini == "/quit" {
            return Ok(false);
        }
        let serp = match self.prompt("SerpAPI Key (Optional, Enter to skip): ").await? {
            Some(key) => key,
            None => {
                return Ok(false);
            }
        };
        if let Err(e) = self.planner.save_credentials(&gemini, Some(&serp)) {
            info!("API keys not saved: {}", e);
        }
        Ok(true)
    }

    async fn collect_trip(&mut self) -> SessionResult<bool> {
        let trip = match self.trip_form().await? {
            FormOutcome::Submitted(trip) => trip,
            FormOutcome::Restart => {
                return Ok(true);
            }
            FormOutcome::Quit => {
                return Ok(false);
            }
        };
        self.writeln("\nGenerating Plan...").await?;
        if self.planner.submit_trip(trip).await.is_err() {
            if let Some(banner) = self.planner.error_banner().map(str::to_string) {
                self.writeln(&format!("Error: {}", banner)).await?;
            }
        } else {
            self.show_result().await?;
        }
        Ok(true)
    }

    async fn ask_field(&mut self, label: &str) -> SessionResult<Option<String>> {
        match self.prompt(label).await? {
            Some(value) if value == "/quit" => Ok(None),
            other => Ok(other),
        }
    }

    async fn trip_form(&mut self) -> SessionResult<FormOutcome> {
        self.writeln("\nPlan Your Trip (type /quit to exit)").await?;
        let has_serp = self.planner.credentials().serp_key().is_some();

        macro_rules! field {
            ($label:expr) => {
                match self.ask_field($label).await? {
                    Some(value) => value,
                    None => {
                        return Ok(FormOutcome::Quit);
                    }
                }
            };
        }

        let source = field!("Departure From (City or Airport, e.g. New Delhi (DEL)): ");
        let destination = field!("Destination (City or Airport, e.g. Hanoi (HAN)): ");
        let start = field!("Start date (YYYY-MM-DD): ");
        let end = field!("End date (YYYY-MM-DD): ");
        let budget = field!("Budget (e.g. $3000): ");
        let travelers = field!("Travelers [1]: ");
        self.writeln(&format!("Interests (max {}): {}", MAX_INTERESTS, INTEREST_OPTIONS.join(", "))).await?;
        let interests_line = field!("Interests, comma separated: ");
        let flights_hint = if has_serp {
            "Real flight data will be fetched using SerpAPI"
        } else {
            "Mock flight data will be used (add a SerpAPI key to get real data)"
        };
        self.writeln(flights_hint).await?;
        let include = field!("Include flight options? [y/N]: ");

        let dates = parse_trip_date(&start).and_then(|s| parse_trip_date(&end).map(|e| (s, e)));
        let (start_date, end_date) = match dates {
            Ok(dates) => dates,
            Err(e) => {
                self.writeln(&format!("Error: {}", e)).await?;
                return Ok(FormOutcome::Restart);
            }
        };

        let travelers = match travelers.as_str() {
            "" => 1,
            value =>
                match value.parse::<u32>() {
                    Ok(n) if n >= 1 => n,
                    _ => {
                        self.writeln(
                            &format!("Error: Number of travelers must be a whole number of at least 1, got '{}'", value)
                        ).await?;
                        return Ok(FormOutcome::Restart);
                    }
                }
        };

        let mut interests = Interests::new();
        for interest in interests_line.split(',') {
            if !interest.trim().is_empty() && !interests.add(interest) {
                self.writeln(&format!("Skipping interest '{}'", interest.trim())).await?;
            }
        }

        let built = TripRequest::builder(&source, &destination)
            .dates(start_date, end_date)
            .budget(&budget)
            .travelers(travelers)
            .interests(interests)
            .include_transportation(matches!(include.to_ascii_lowercase().as_str(), "y" | "yes"))
            .build();
        match built {
            Ok(trip) => Ok(FormOutcome::Submitted(trip)),
            Err(e) => {
                self.writeln(&format!("Error: {}", e)).await?;
                Ok(FormOutcome::Restart)
            }
        }
    }

    async fn show_result(&mut self) -> SessionResult<()> {
        self.flush_notices().await?;
        let text = match self.planner.result() {
            Some(result) => {
                let mut text = format!(
                    "\nYour Travel Plan\n\n{}",
                    render::render_itinerary(&result.itinerary)
                );
                if let Some(panel) = &result.flights {
                    text.push('\n');
                    text.push_str(&render::render_flights(panel, Utc::now().timestamp_millis()));
                }
                text
            }
            None => {
                return Ok(());
            }
        };
        self.writeln(&text).await?;
        self.writeln("Type a question about your plan, or /help for commands.").await
    }

    async fn result_view(&mut self) -> SessionResult<bool> {
        let input = match self.prompt("\n> ").await? {
            Some(line) => line,
            None => {
                return Ok(false);
            }
        };
        let mut parts = input.splitn(2, ' ');
        let command = parts.next().unwrap_or_default();
        let argument = parts.next().unwrap_or_default().trim();

        match command {
            "" => {}
            "/quit" | "/exit" => {
                return Ok(false);
            }
            "/help" => self.writeln(HELP).await?,
            "/new" => {
                self.planner.start_over()?;
            }
            "/plan" => {
                let text = self.planner
                    .result()
                    .map(|r| render::render_itinerary(&r.itinerary))
                    .unwrap_or_default();
                self.writeln(&text).await?;
            }
            "/flights" => {
                let text = match self.planner.result().and_then(|r| r.flights.as_ref()) {
                    Some(panel) => render::render_flights(panel, Utc::now().timestamp_millis()),
                    None => "Flight options were not requested for this trip.".to_string(),
                };
                self.writeln(&text).await?;
            }
            "/chat" => {
                let text = self.planner
                    .result()
                    .map(|r| render::render_transcript(&r.transcript))
                    .unwrap_or_default();
                self.writeln(&text).await?;
            }
            "/book" => {
                let text = self.booking_link(argument);
                self.writeln(&text).await?;
            }
            "/keys" => {
                return self.collect_keys().await;
            }
            _ => {
                self.writeln("Thinking...").await?;
                if let Ok(answer) = self.planner.ask(&input).await {
                    let text = render::render_itinerary(&answer);
                    self.writeln(&format!("\nAssistant:\n{}", text)).await?;
                }
            }
        }
        Ok(true)
    }

    fn booking_link(&self, argument: &str) -> String {
        let quotes = match self.planner.result().and_then(|r| r.flights.as_ref()) {
            Some(panel) => &panel.quotes.best_flights,
            None => {
                return "Flight options were not requested for this trip.".to_string();
            }
        };
        match argument.parse::<usize>() {
            Ok(n) if n >= 1 && n <= quotes.len() => {
                let url = render::booking_url(&quotes[n - 1].booking_token, Utc::now().timestamp_millis());
                format!("Opening booking page: {}", url)
            }
            _ => format!("Usage: /book N where N is between 1 and {}", quotes.len()),
        }
    }
}

pub async fn run_session<R, W>(planner: &mut TripPlanner, reader: R, writer: W) -> SessionResult<()>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    Session::new(planner, reader, writer).run().await
}
