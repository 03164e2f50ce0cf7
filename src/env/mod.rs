use crate::{action::Action, error::EnvError};

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "tcp")]
pub use tcp::TcpEnvironment;

/// The channel to an external environment
///
/// The agent sends one action name per step and blocks on the reply. Replies are
/// kept in their wire form, a binary digit string for the next state and a decimal
/// string for the reward; [`Environment::step`] decodes them.
pub trait Environment {
    /// Send `action` (one of `"left"`, `"right"`, `"jump"`) and wait for the environment's reaction
    ///
    /// **Returns** `(next_state_encoding, reward)`
    fn exchange(&mut self, action: &str) -> Result<(String, String), EnvError>;

    /// Take `action` and decode the reply into `(next_state, reward)`
    ///
    /// **Errors** if the channel fails or the reply does not decode into a state below `num_states`
    fn step(&mut self, action: Action, num_states: usize) -> Result<(usize, f64), EnvError> {
        let (state, reward) = self.exchange(action.as_ref())?;
        Ok((decode_state(&state, num_states)?, decode_reward(&reward)?))
    }
}

impl<E: Environment + ?Sized> Environment for &mut E {
    fn exchange(&mut self, action: &str) -> Result<(String, String), EnvError> {
        (**self).exchange(action)
    }
}

/// Decode a base-2 state encoding such as `"0010111"` or `"0b0010111"`
pub fn decode_state(encoding: &str, num_states: usize) -> Result<usize, EnvError> {
    let trimmed = encoding.trim();
    let digits = trimmed
        .strip_prefix("0b")
        .or_else(|| trimmed.strip_prefix("0B"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(EnvError::MalformedState(encoding.to_owned()));
    }
    let state = usize::from_str_radix(digits, 2)
        .map_err(|_| EnvError::MalformedState(encoding.to_owned()))?;
    if state >= num_states {
        return Err(EnvError::StateOutOfRange { state, num_states });
    }
    Ok(state)
}

/// Decode a reward such as `"-14"` or `"300.0"`
pub fn decode_reward(text: &str) -> Result<f64, EnvError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .ok_or_else(|| EnvError::MalformedReward(text.to_owned()))
}
