use wb_dice::{DicePool, OsRandom, resolve};
use wb_session::UserId;
use wb_session::render::roll_announcement;

pub fn run(notation: &str, user: &str) -> Result<(), String> {
    let pool = notation
        .parse::<DicePool>()
        .map_err(|e| e.to_string())?;
    let outcome = resolve(&pool, &OsRandom::new()).map_err(|e| format!("roll failed: {e}"))?;
    println!("{}", roll_announcement(&UserId::new(user), &pool, &outcome));
    Ok(())
}
