use chrono::NaiveDateTime;
use url::Url;

use crate::models::chat::{ ChatTranscript, Speaker };
use crate::models::flight::FlightQuote;
use crate::planner::{ FlightDataSource, FlightPanel, Notice, NoticeLevel };

pub const BOOKING_DOMAIN: &str = "flights.wanderlust-ai.example.com";
pub const BOOKING_SOURCE_TAG: &str = "wanderlust-app";

pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        format!("{}m", mins)
    } else if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// "2025-04-15 00:05" → "12:05 AM". Unparseable values are shown as-is.
pub fn format_timestamp(timestamp: &str) -> String {
    match NaiveDateTime::parse_from_str(timestamp.trim(), "%Y-%m-%d %H:%M") {
        Ok(dt) => dt.format("%I:%M %p").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

pub fn booking_url(booking_token: &str, timestamp_ms: i64) -> String {
    let base = format!("https://{}/checkout", BOOKING_DOMAIN);
    let timestamp = timestamp_ms.to_string();
    match
        Url::parse_with_params(
            &base,
            &[
                ("token", booking_token),
                ("source", BOOKING_SOURCE_TAG),
                ("timestamp", timestamp.as_str()),
                ("redirect", "checkout"),
            ]
        )
    {
        Ok(url) => url.to_string(),
        Err(_) => base,
    }
}

pub fn render_itinerary(markdown: &str) -> String {
    let mut out = String::new();
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            let level = trimmed.chars().take_while(|c| *c == '#').count();
            let title = trimmed[level..].trim().replace("**", "");
            let rule = if level <= 1 { '=' } else { '-' };
            out.push_str(&title);
            out.push('\n');
            out.push_str(&rule.to_string().repeat(title.chars().count()));
        } else if let Some(item) = trimmed.strip_prefix("* ").or_else(|| trimmed.strip_prefix("- ")) {
            let indent = line.len() - trimmed.len();
            out.push_str(&" ".repeat(indent));
            out.push_str("• ");
            out.push_str(item);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn render_quote(out: &mut String, index: usize, quote: &FlightQuote, timestamp_ms: i64) {
    let (first, last) = match (quote.first_segment(), quote.last_segment()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return;
        }
    };
    let stops = match quote.stops() {
        0 => "Nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    };
    out.push_str(
        &format!(
            "[{}] {} · ${} · {} · {}\n",
            index + 1,
            first.airline,
            quote.price,
            format_duration(quote.total_duration),
            stops
        )
    );
    out.push_str(
        &format!(
            "    {} {} → {} {}\n",
            format_timestamp(&first.departure_airport.time),
            first.departure_airport.id,
            format_timestamp(&last.arrival_airport.time),
            last.arrival_airport.id
        )
    );

    for (idx, segment) in quote.flights.iter().enumerate() {
        if idx > 0 {
            if let Some(layover) = quote.layovers.get(idx - 1) {
                out.push_str(
                    &format!(
                        "      ⏱ {} layover at {} ({})\n",
                        format_duration(layover.duration),
                        layover.name,
                        layover.id
                    )
                );
            }
        }
        out.push_str(
            &format!(
                "      {} {} · {} · {}{}\n",
                segment.airline,
                segment.flight_number,
                segment.travel_class,
                format_duration(segment.duration),
                segment.airplane
                    .as_deref()
                    .map(|a| format!(" · {}", a))
                    .unwrap_or_default()
            )
        );
        out.push_str(
            &format!(
                "        {} {} ({}) → {} {} ({}){}\n",
                format_timestamp(&segment.departure_airport.time),
                segment.departure_airport.name,
                segment.departure_airport.id,
                format_timestamp(&segment.arrival_airport.time),
                segment.arrival_airport.name,
                segment.arrival_airport.id,
                if segment.overnight { " · overnight" } else { "" }
            )
        );
        for ext in &segment.extensions {
            out.push_str(&format!("        - {}\n", ext));
        }
    }
    out.push_str(&format!("    Book: {}\n", booking_url(&quote.booking_token, timestamp_ms)));
}

pub fn render_flights(panel: &FlightPanel, timestamp_ms: i64) -> String {
    let mut out = String::from("Available Flights\n=================\n");
    if panel.source == FlightDataSource::Mock {
        out.push_str("(sample data)\n");
    }
    if panel.quotes.best_flights.is_empty() {
        out.push_str("No flights found for this route and date.\n");
        return out;
    }
    for (index, quote) in panel.quotes.best_flights.iter().enumerate() {
        out.push('\n');
        render_quote(&mut out, index, quote, timestamp_ms);
    }
    out
}

pub fn render_transcript(transcript: &ChatTranscript) -> String {
    if transcript.is_empty() {
        return "Have questions about your travel plan? Ask away!\nExamples: \"What should I pack?\", \"Any local customs I should know about?\"\n".to_string();
    }
    let mut out = String::new();
    for message in transcript.messages() {
        let who = match message.speaker {
            Speaker::User => "You",
            Speaker::Assistant => "Assistant",
        };
        out.push_str(&format!("{}:\n{}\n\n", who, render_itinerary(&message.text).trim_end()));
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Info => "ℹ",
        NoticeLevel::Error => "✗",
    };
    format!("{} {}: {}", marker, notice.title, notice.description)
}
