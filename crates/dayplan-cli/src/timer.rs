use std::{
    io::{self, Write},
    time::Duration,
};

use color_eyre::Result;
use dayplan_core::timer::Countdown;
use tracing::info;

/// Counts down in place on the terminal until zero or Ctrl-C.
pub async fn run(minutes: u32, seconds: u32) -> Result<()> {
    let mut countdown = Countdown::new(minutes, seconds);
    if !countdown.start() {
        println!("Set a duration above 00:00 to start the timer.");
        return Ok(());
    }
    info!(seconds = countdown.remaining_secs(), "meditation timer started");

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    ticker.tick().await;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stdout = io::stdout();
    draw(&mut stdout, &countdown)?;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let finished = countdown.tick();
                draw(&mut stdout, &countdown)?;
                if finished {
                    writeln!(stdout, "\nTime is up.")?;
                    break;
                }
            }
            _ = &mut ctrl_c => {
                countdown.stop();
                writeln!(stdout, "\nStopped with {countdown} left.")?;
                break;
            }
        }
    }
    Ok(())
}

fn draw(out: &mut impl Write, countdown: &Countdown) -> io::Result<()> {
    write!(out, "\r{countdown}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_in_place() {
        let mut buf = Vec::new();
        draw(&mut buf, &Countdown::new(1, 5)).expect("draw");
        assert_eq!(buf, b"\r01:05");
    }

    #[tokio::test]
    async fn zero_duration_returns_immediately() {
        run(0, 0).await.expect("nothing to count");
    }
}
