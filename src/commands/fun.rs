use poise::CreateReply;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::commands::reply_error;
use crate::utils::embed;
use crate::{Context, Error};

const MAX_DICE: u32 = 100;
const MIN_SIDES: u32 = 2;
const MAX_SIDES: u32 = 1000;

const EIGHT_BALL: [&str; 20] = [
    "It is certain.",
    "It is decidedly so.",
    "Without a doubt.",
    "Yes, definitely.",
    "You may rely on it.",
    "As I see it, yes.",
    "Most likely.",
    "Outlook good.",
    "Yes.",
    "Signs point to yes.",
    "Reply hazy, try again.",
    "Ask again later.",
    "Better not tell you now.",
    "Cannot predict now.",
    "Concentrate and ask again.",
    "Don't count on it.",
    "My reply is no.",
    "My sources say no.",
    "Outlook not so good.",
    "Very doubtful.",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
}

#[derive(Debug, PartialEq)]
pub enum DiceError {
    Malformed,
    TooManyDice,
    BadSides,
}

impl std::fmt::Display for DiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "use the NdM format, e.g. `2d6` or `d20`"),
            Self::TooManyDice => write!(f, "roll between 1 and {MAX_DICE} dice"),
            Self::BadSides => write!(f, "dice need between {MIN_SIDES} and {MAX_SIDES} sides"),
        }
    }
}

impl std::error::Error for DiceError {}

/// Parses `NdM`. `N` defaults to 1 when omitted (`d20`).
pub fn parse_dice(input: &str) -> Result<Dice, DiceError> {
    let input = input.trim().to_lowercase();
    let (count, sides) = input.split_once('d').ok_or(DiceError::Malformed)?;

    let count: u32 = if count.is_empty() {
        1
    } else {
        count.parse().map_err(|_| DiceError::Malformed)?
    };
    let sides: u32 = sides.parse().map_err(|_| DiceError::Malformed)?;

    if count == 0 || count > MAX_DICE {
        return Err(DiceError::TooManyDice);
    }
    if !(MIN_SIDES..=MAX_SIDES).contains(&sides) {
        return Err(DiceError::BadSides);
    }
    Ok(Dice { count, sides })
}

fn roll_dice<R: Rng>(rng: &mut R, dice: Dice) -> Vec<u32> {
    (0..dice.count)
        .map(|_| rng.gen_range(1..=dice.sides))
        .collect()
}

/// Flip a coin
#[poise::command(slash_command)]
pub async fn coinflip(ctx: Context<'_>) -> Result<(), Error> {
    let heads = rand::thread_rng().gen_bool(0.5);
    ctx.say(if heads { "🪙 **Heads**" } else { "🪙 **Tails**" })
        .await?;
    Ok(())
}

/// Roll dice, e.g. 2d6
#[poise::command(slash_command)]
pub async fn roll(
    ctx: Context<'_>,
    #[description = "Dice in NdM format (default 1d6)"] dice: Option<String>,
) -> Result<(), Error> {
    let spec = dice.unwrap_or_else(|| "1d6".to_string());
    let dice = match parse_dice(&spec) {
        Ok(dice) => dice,
        Err(e) => {
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };

    let rolls = roll_dice(&mut rand::thread_rng(), dice);
    let total: u32 = rolls.iter().sum();
    let message = if rolls.len() == 1 {
        format!("🎲 {}d{}: **{total}**", dice.count, dice.sides)
    } else {
        let shown: Vec<String> = rolls.iter().map(u32::to_string).collect();
        format!(
            "🎲 {}d{}: {} = **{total}**",
            dice.count,
            dice.sides,
            shown.join(" + ")
        )
    };

    ctx.say(crate::utils::components::truncate_str(&message, 2000))
        .await?;
    Ok(())
}

/// Ask the magic 8-ball
#[poise::command(slash_command, rename = "8ball")]
pub async fn eight_ball(
    ctx: Context<'_>,
    #[description = "Your yes/no question"] question: String,
) -> Result<(), Error> {
    let answer = EIGHT_BALL
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Ask again later.");
    ctx.send(CreateReply::default().embed(embed::info(
        "🎱 Magic 8-ball",
        &format!("**{question}**\n{answer}"),
    )))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_dice() {
        assert_eq!(parse_dice("2d6"), Ok(Dice { count: 2, sides: 6 }));
        assert_eq!(parse_dice("D20"), Ok(Dice { count: 1, sides: 20 }));
        assert_eq!(parse_dice(" 100d1000 "), Ok(Dice { count: 100, sides: 1000 }));
    }

    #[test]
    fn test_parse_dice_limits() {
        assert_eq!(parse_dice("0d6"), Err(DiceError::TooManyDice));
        assert_eq!(parse_dice("101d6"), Err(DiceError::TooManyDice));
        assert_eq!(parse_dice("1d1"), Err(DiceError::BadSides));
        assert_eq!(parse_dice("1d1001"), Err(DiceError::BadSides));
        assert_eq!(parse_dice("six"), Err(DiceError::Malformed));
        assert_eq!(parse_dice("2d"), Err(DiceError::Malformed));
        assert_eq!(parse_dice("-1d6"), Err(DiceError::Malformed));
    }

    #[test]
    fn test_rolls_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let dice = Dice { count: 100, sides: 6 };
        let rolls = roll_dice(&mut rng, dice);
        assert_eq!(rolls.len(), 100);
        assert!(rolls.iter().all(|r| (1..=6).contains(r)));
    }
}
