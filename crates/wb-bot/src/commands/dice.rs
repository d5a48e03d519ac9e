use colored::Colorize;

use wb_dice::DieKind;

pub fn run() -> Result<(), String> {
    println!("  {}", "Dice".bold());
    for kind in DieKind::CATALOG {
        let note = if kind.is_plot() {
            "1: Complication +4, 2: Complication +2, 3-4: Nothing happens, 5-6: Opportunity"
                .to_string()
        } else {
            format!("1-{}", kind.faces())
        };
        println!("  {:<6} {note}", kind.pool_key());
    }
    Ok(())
}
