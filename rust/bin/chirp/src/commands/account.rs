//! `chirp register`, `chirp login`.

use anyhow::Result;
use chirp_feed::FeedService;

use crate::output::{print_json, user_line, Format};

fn read_password(given: Option<String>, confirm: bool) -> Result<(String, String)> {
    if let Some(p) = given {
        // Non-interactive mode (CI/automation).
        return Ok((p.clone(), p));
    }
    let pw = rpassword::prompt_password("Password: ")?;
    let again = if confirm {
        rpassword::prompt_password("Confirm password: ")?
    } else {
        pw.clone()
    };
    Ok((pw, again))
}

pub fn register(feed: &FeedService, fmt: Format, username: &str, password: Option<String>) -> Result<()> {
    let (password, confirm) = read_password(password, true)?;
    let user = feed.sign_up(username, &password, &confirm)?;
    match fmt {
        Format::Json => print_json(&user),
        Format::Table => {
            println!("registered {}", user_line(&user));
            Ok(())
        }
    }
}

pub fn login(feed: &FeedService, fmt: Format, username: &str, password: Option<String>) -> Result<()> {
    let (password, _) = read_password(password, false)?;
    let user = feed.sign_in(username, &password)?;
    match fmt {
        Format::Json => print_json(&user),
        Format::Table => {
            println!("signed in as {}", user_line(&user));
            Ok(())
        }
    }
}
