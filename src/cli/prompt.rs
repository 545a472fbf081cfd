//! Interactive prompts.
//!
//! Generic over the input and output streams so runs can be scripted.

use crate::models::event::Event;
use crate::models::selection::{format_day, is_valid_day, Selection};
use crate::models::video::VideoBasicInfo;
use crate::Result;
use chrono::{Days, NaiveDate};
use colored::Colorize;
use std::io::{BufRead, Write};

const DAY_CHOICES: [&str; 3] = ["Today", "Yesterday", "Another day"];

/// Asks the operator questions.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}: ", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(crate::Error::UserAborted("input closed".to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask for a number between `start` and `end`, inclusive.
    pub fn choose_number(&mut self, start: usize, end: usize) -> Result<usize> {
        loop {
            let answer = self.ask("Please choose a number from the list above")?;
            match answer.trim().parse::<usize>() {
                Ok(n) if (start..=end).contains(&n) => return Ok(n),
                _ => writeln!(self.output, "Invalid number chosen. Please choose a valid number.")?,
            }
        }
    }

    /// Yes/no question; an empty answer takes the default.
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{} {}", question, hint))?;
            match answer.trim().to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }

    /// Let the operator pick an event.
    pub fn pick_event(&mut self, events: &[Event]) -> Result<Event> {
        if events.is_empty() {
            return Err(crate::Error::InvalidEventsFile("no events defined".to_string()));
        }
        for (i, event) in events.iter().enumerate() {
            writeln!(self.output, "{}: {}", i + 1, event.video_title())?;
        }
        let n = self.choose_number(1, events.len())?;
        let event = events[n - 1].clone();
        writeln!(self.output, "You picked: {} - {}", n, event.video_title())?;
        Ok(event)
    }

    /// Ask for the end of a complex title until the operator accepts it.
    pub fn complete_title(&mut self, event: &Event) -> Result<String> {
        loop {
            writeln!(
                self.output,
                "Your event has a complex naming (you need to complete it). The beginning of the title is:"
            )?;
            writeln!(self.output, "{}", event.video_title())?;
            writeln!(self.output, "It has to follow this format:")?;
            writeln!(self.output, "{}", event.format_helper().unwrap_or_default())?;

            let suffix = self.ask("Please complete the title")?;
            if suffix.is_empty() {
                writeln!(self.output, "The title completion cannot be empty.")?;
                continue;
            }
            writeln!(self.output, "Complete title: {}{}", event.video_title(), suffix)?;

            if self.confirm("Are you happy with this title?", true)? {
                return Ok(suffix);
            }
            writeln!(self.output, "Let's try completing the title again.")?;
        }
    }

    /// Ask which day the event happened, as `DD/MM/YYYY`.
    pub fn pick_day(&mut self, today: NaiveDate) -> Result<String> {
        writeln!(self.output, "The event occurred:")?;
        for (i, day) in DAY_CHOICES.iter().enumerate() {
            writeln!(self.output, "{}: {}", i + 1, day)?;
        }
        let n = self.choose_number(1, DAY_CHOICES.len())?;
        writeln!(self.output, "You picked: {} - {}", n, DAY_CHOICES[n - 1])?;

        match n {
            1 => Ok(format_day(today)),
            2 => {
                let yesterday = today
                    .checked_sub_days(Days::new(1))
                    .ok_or_else(|| crate::Error::other("no day before the minimum date"))?;
                Ok(format_day(yesterday))
            }
            _ => loop {
                let day = self.ask("Please specify the day in DD/MM/YYYY format")?;
                let day = day.trim();
                if is_valid_day(day) {
                    writeln!(self.output, "You specified the day as: {}", day)?;
                    break Ok(day.to_string());
                }
                writeln!(
                    self.output,
                    "The date format is incorrect. Please use DD/MM/YYYY format."
                )?;
            },
        }
    }

    /// Show the videos found and ask to go on. Declining aborts the run.
    pub fn confirm_videos(&mut self, videos: &[VideoBasicInfo]) -> Result<()> {
        writeln!(self.output, "{}", "Video(s) found on the device:".bold())?;
        for video in videos {
            writeln!(
                self.output,
                "Size: {} Mb - Date created: {} - Name: {}",
                video.size_mb, video.creation_date, video.original_name
            )?;
        }
        if self.confirm("Do you want to continue?", true)? {
            Ok(())
        } else {
            Err(crate::Error::UserAborted(
                "videos found on the device were not validated".to_string(),
            ))
        }
    }

    /// Collect the event, title suffix and day for a run.
    pub fn prompt_selection(&mut self, events: &[Event], today: NaiveDate) -> Result<Selection> {
        let event = self.pick_event(events)?;
        let suffix = if event.complex_naming() {
            Some(self.complete_title(&event)?)
        } else {
            None
        };
        let day = self.pick_day(today)?;
        Selection::new(day, event, suffix)
    }
}
