//! Text to timed mouth-shape events, without phoneme analysis.
//!
//! The schedule is a flat approximation: time is split evenly per word and
//! then per character, each character mapping to a coarse viseme class. The
//! contract is only the discrete timeline; any crossfade between shapes is
//! the renderer's business.

/// Discrete mouth shapes, matching the VRM blend-shape set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Viseme {
    /// Mouth wide open ("father").
    Aa,
    /// Mouth medium open ("bed").
    E,
    /// Mouth slightly open ("bit").
    Ih,
    /// Mouth rounded ("boat").
    Oh,
    /// Lips pursed ("boot").
    Ou,
    /// Lips closed (p/b/m).
    Pp,
    /// Lower lip to teeth (f/v).
    Ff,
    /// Tongue to teeth (t/d).
    Th,
    /// Teeth close (s/z).
    Ss,
    /// Lips rounded (r).
    Rr,
    /// Tongue up (l).
    Nn,
    /// Neutral / closed. Also the sentinel for "no data".
    #[default]
    Sil,
}

impl Viseme {
    /// Stable index into the renderer's viseme blend-shape table.
    pub fn index(self) -> u8 {
        match self {
            Viseme::Aa => 0,
            Viseme::E => 1,
            Viseme::Ih => 2,
            Viseme::Oh => 3,
            Viseme::Ou => 4,
            Viseme::Pp => 5,
            Viseme::Ff => 6,
            Viseme::Th => 7,
            Viseme::Ss => 8,
            Viseme::Rr => 9,
            Viseme::Nn => 10,
            Viseme::Sil => 11,
        }
    }

    pub fn phoneme(self) -> &'static str {
        match self {
            Viseme::Aa => "aa",
            Viseme::E => "E",
            Viseme::Ih => "ih",
            Viseme::Oh => "oh",
            Viseme::Ou => "ou",
            Viseme::Pp => "PP",
            Viseme::Ff => "FF",
            Viseme::Th => "TH",
            Viseme::Ss => "SS",
            Viseme::Rr => "RR",
            Viseme::Nn => "nn",
            Viseme::Sil => "sil",
        }
    }

    /// Coarse character class. Anything unmapped (digits, punctuation,
    /// consonants without a distinct shape) reads as silence.
    fn from_char(c: char) -> Viseme {
        match c {
            'a' => Viseme::Aa,
            'e' => Viseme::E,
            'i' | 'y' => Viseme::Ih,
            'o' => Viseme::Oh,
            'u' | 'w' => Viseme::Ou,
            'p' | 'b' | 'm' => Viseme::Pp,
            'f' | 'v' => Viseme::Ff,
            't' | 'd' => Viseme::Th,
            's' | 'z' => Viseme::Ss,
            'r' => Viseme::Rr,
            'l' => Viseme::Nn,
            _ => Viseme::Sil,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisemeEvent {
    /// Offset from utterance start, seconds. Non-decreasing within a track.
    pub time: f32,
    pub viseme: Viseme,
    pub phoneme: &'static str,
}

/// Immutable timeline for one utterance.
#[derive(Debug, Clone, Default)]
pub struct VisemeTrack {
    events: Vec<VisemeEvent>,
}

impl VisemeTrack {
    pub fn events(&self) -> &[VisemeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last event; 0 for an empty track.
    pub fn duration(&self) -> f32 {
        self.events.last().map(|ev| ev.time).unwrap_or(0.0)
    }

    /// Viseme active at `t`: the last event whose time is `<= t`, the first
    /// event for a too-early query, the silence sentinel for an empty track.
    pub fn at(&self, t: f32) -> Viseme {
        if self.events.is_empty() {
            return Viseme::Sil;
        }
        for ev in self.events.iter().rev() {
            if t >= ev.time {
                return ev.viseme;
            }
        }
        self.events[0].viseme
    }
}

/// Average speaking rate fallback: seconds of mouth time per word.
pub const SECONDS_PER_WORD: f32 = 0.4;
/// Silent gap appended after each word.
pub const WORD_GAP_SECONDS: f32 = 0.05;

/// Build the viseme timeline for `text`.
///
/// With no explicit `duration`, total mouth time is estimated from the word
/// count. The track always ends on a silence event; blank input produces a
/// single silence event at t=0.
pub fn text_to_visemes(text: &str, duration: Option<f32>) -> VisemeTrack {
    schedule(text, duration, SECONDS_PER_WORD, WORD_GAP_SECONDS)
}

/// As [`text_to_visemes`] with explicit pacing, for config-driven callers.
pub fn schedule(
    text: &str,
    duration: Option<f32>,
    seconds_per_word: f32,
    word_gap: f32,
) -> VisemeTrack {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return VisemeTrack {
            events: vec![silence_at(0.0)],
        };
    }

    let seconds_per_word = seconds_per_word.max(1e-3);
    let word_gap = word_gap.max(0.0);
    let total = duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(words.len() as f32 * seconds_per_word);
    let per_word = total / words.len() as f32;

    let mut events = Vec::new();
    let mut t = 0.0f32;
    for word in words {
        let chars: Vec<char> = word.chars().collect();
        let per_char = per_word / chars.len() as f32;
        for c in chars {
            let viseme = Viseme::from_char(c.to_ascii_lowercase());
            events.push(VisemeEvent {
                time: t,
                viseme,
                phoneme: viseme.phoneme(),
            });
            t += per_char;
        }
        events.push(silence_at(t));
        t += word_gap;
    }

    VisemeTrack { events }
}

fn silence_at(t: f32) -> VisemeEvent {
    VisemeEvent {
        time: t,
        viseme: Viseme::Sil,
        phoneme: Viseme::Sil.phoneme(),
    }
}
