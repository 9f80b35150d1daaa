use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use rsvp_core::{Quadrant, Response, ResponseKey, Screen};
use rsvp_experiment::Frontend;
use rsvp_timing::Timer;

/// Text-mode stand-in for the stimulus display: screens are printed,
/// answers are typed as `y` / `n` followed by Enter.
pub struct ConsoleFrontend<T: Timer<Timestamp = u64>, I: BufRead, O: Write> {
    timer: T,
    input: I,
    output: O,
}

impl<T: Timer<Timestamp = u64>, I: BufRead, O: Write> ConsoleFrontend<T, I, O> {
    pub fn new(timer: T, input: I, output: O) -> Self {
        Self {
            timer,
            input,
            output,
        }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed while waiting for a response");
        }
        Ok(line)
    }

    fn draw_rsvp(&mut self, screen: &Screen) -> Result<()> {
        let Screen::Rsvp { pictures } = screen else {
            return Ok(());
        };
        let cell = |q: Quadrant| {
            pictures
                .iter()
                .find(|p| p.quadrant == q)
                .map_or_else(|| "[mask]".to_string(), |p| p.picture.to_string())
        };
        writeln!(
            self.output,
            "  {:<24}{:<24}\n  {:<24}{:<24}",
            cell(Quadrant::TopLeft),
            cell(Quadrant::TopRight),
            cell(Quadrant::BottomLeft),
            cell(Quadrant::BottomRight),
        )?;
        Ok(())
    }
}

impl<T: Timer<Timestamp = u64>, I: BufRead, O: Write> Frontend for ConsoleFrontend<T, I, O> {
    fn present(&mut self, screen: &Screen) -> Result<()> {
        match screen {
            Screen::Blank => writeln!(self.output)?,
            Screen::Fixation => writeln!(self.output, "\n        +\n")?,
            Screen::Rsvp { .. } => self.draw_rsvp(screen)?,
            Screen::TestPicture(picture) => writeln!(self.output, "\n  >>> {picture} <<<")?,
            Screen::Text { title, body } => {
                writeln!(self.output, "\n=== {title} ===\n\n{body}\n")?
            }
        }
        self.output.flush()?;
        Ok(())
    }

    fn wait_key(&mut self, accepted: &[ResponseKey]) -> Result<Response> {
        let start = self.timer.now();
        loop {
            write!(self.output, "seen it? [y/n] ")?;
            self.output.flush()?;
            let line = self.read_line()?;
            let key = line.trim().chars().next().and_then(ResponseKey::from_char);
            if let Some(key) = key.filter(|k| accepted.contains(k)) {
                let rt_ms = self.timer.elapsed(start).as_millis() as u64;
                return Ok(Response { key, rt_ms });
            }
        }
    }

    fn wait_continue(&mut self) -> Result<()> {
        self.read_line().map(|_| ())
    }
}
