//! Localized notification and voice phrases

use std::env;

/// Environment variables consulted for the UI language, in order
const LANGUAGE_VARS: [&str; 3] = ["LANGUAGE", "LC_ALL", "LANG"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    De,
    Fr,
    Es,
    It,
    Nl,
    Pt,
    Ja,
    Zh,
}

/// Fixed set of user-facing messages for one language
#[derive(Debug)]
pub struct Phrases {
    pub title: &'static str,
    pub grace_body: &'static str,
    pub grace_voice: &'static str,
    final_voice: &'static str,
    pub warn5_body: &'static str,
    pub warn5_voice: &'static str,
    pub warn1_body: &'static str,
    pub warn1_voice: &'static str,
}

impl Phrases {
    /// Final warning, addressed to the child
    pub fn final_voice(&self, child_id: &str) -> String {
        self.final_voice.replace("{child_id}", child_id)
    }
}

static EN: Phrases = Phrases {
    title: "Screen Time",
    grace_body: "Screen time will end in 1 minute.",
    grace_voice: "Screen time will end in one minute.",
    final_voice: "You have used all your screen time {child_id}.",
    warn5_body: "5 minutes of screen time remain.",
    warn5_voice: "You have five minutes of screen time left.",
    warn1_body: "1 minute of screen time remains.",
    warn1_voice: "You have one minute of screen time left.",
};

static DE: Phrases = Phrases {
    title: "Bildschirmzeit",
    grace_body: "Bildschirmzeit endet in 1 Minute.",
    grace_voice: "Die Bildschirmzeit endet in einer Minute.",
    final_voice: "Du hast deine Bildschirmzeit aufgebraucht {child_id}.",
    warn5_body: "Noch 5 Minuten Bildschirmzeit übrig.",
    warn5_voice: "Du hast noch fünf Minuten Bildschirmzeit.",
    warn1_body: "Noch 1 Minute Bildschirmzeit übrig.",
    warn1_voice: "Du hast noch eine Minute Bildschirmzeit.",
};

static FR: Phrases = Phrases {
    title: "Temps d'écran",
    grace_body: "Le temps d'écran se termine dans 1 minute.",
    grace_voice: "Le temps d'écran se termine dans une minute.",
    final_voice: "Tu as utilisé tout ton temps d'écran {child_id}.",
    warn5_body: "Il reste 5 minutes de temps d'écran.",
    warn5_voice: "Il te reste cinq minutes de temps d'écran.",
    warn1_body: "Il reste 1 minute de temps d'écran.",
    warn1_voice: "Il te reste une minute de temps d'écran.",
};

static ES: Phrases = Phrases {
    title: "Tiempo de pantalla",
    grace_body: "El tiempo de pantalla terminará en 1 minuto.",
    grace_voice: "El tiempo de pantalla terminará en un minuto.",
    final_voice: "Has usado todo tu tiempo de pantalla {child_id}.",
    warn5_body: "Quedan 5 minutos de tiempo de pantalla.",
    warn5_voice: "Te quedan cinco minutos de tiempo de pantalla.",
    warn1_body: "Queda 1 minuto de tiempo de pantalla.",
    warn1_voice: "Te queda un minuto de tiempo de pantalla.",
};

static IT: Phrases = Phrases {
    title: "Tempo schermo",
    grace_body: "Il tempo schermo finirà tra 1 minuto.",
    grace_voice: "Il tempo schermo finirà tra un minuto.",
    final_voice: "Hai usato tutto il tempo schermo {child_id}.",
    warn5_body: "Restano 5 minuti di tempo schermo.",
    warn5_voice: "Ti restano cinque minuti di tempo schermo.",
    warn1_body: "Resta 1 minuto di tempo schermo.",
    warn1_voice: "Ti resta un minuto di tempo schermo.",
};

static NL: Phrases = Phrases {
    title: "Schermtijd",
    grace_body: "Schermtijd eindigt over 1 minuut.",
    grace_voice: "Schermtijd eindigt over een minuut.",
    final_voice: "Je hebt al je schermtijd gebruikt {child_id}.",
    warn5_body: "Nog 5 minuten schermtijd over.",
    warn5_voice: "Je hebt nog vijf minuten schermtijd.",
    warn1_body: "Nog 1 minuut schermtijd over.",
    warn1_voice: "Je hebt nog één minuut schermtijd.",
};

static PT: Phrases = Phrases {
    title: "Tempo de tela",
    grace_body: "O tempo de tela termina em 1 minuto.",
    grace_voice: "O tempo de tela termina em um minuto.",
    final_voice: "Você usou todo o seu tempo de tela {child_id}.",
    warn5_body: "Restam 5 minutos de tempo de tela.",
    warn5_voice: "Você tem cinco minutos de tempo de tela restantes.",
    warn1_body: "Resta 1 minuto de tempo de tela.",
    warn1_voice: "Você tem um minuto de tempo de tela restante.",
};

static JA: Phrases = Phrases {
    title: "スクリーンタイム",
    grace_body: "1分後にスクリーンタイムが終了します。",
    grace_voice: "1分後にスクリーンタイムが終わります。",
    final_voice: "{child_id} のスクリーンタイムを使い切りました。",
    warn5_body: "スクリーンタイムはあと5分です。",
    warn5_voice: "スクリーンタイムはあと5分です。",
    warn1_body: "スクリーンタイムはあと1分です。",
    warn1_voice: "スクリーンタイムはあと1分です。",
};

static ZH: Phrases = Phrases {
    title: "屏幕使用时间",
    grace_body: "屏幕时间将在1分钟后结束。",
    grace_voice: "屏幕时间将在一分钟后结束。",
    final_voice: "你已用完所有屏幕时间 {child_id}。",
    warn5_body: "屏幕时间还剩 5 分钟。",
    warn5_voice: "屏幕时间还剩五分钟。",
    warn1_body: "屏幕时间还剩 1 分钟。",
    warn1_voice: "屏幕时间还剩一分钟。",
};

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::En),
            "de" => Some(Self::De),
            "fr" => Some(Self::Fr),
            "es" => Some(Self::Es),
            "it" => Some(Self::It),
            "nl" => Some(Self::Nl),
            "pt" => Some(Self::Pt),
            "ja" => Some(Self::Ja),
            "zh" => Some(Self::Zh),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Fr => "fr",
            Self::Es => "es",
            Self::It => "it",
            Self::Nl => "nl",
            Self::Pt => "pt",
            Self::Ja => "ja",
            Self::Zh => "zh",
        }
    }

    pub fn phrases(self) -> &'static Phrases {
        match self {
            Self::En => &EN,
            Self::De => &DE,
            Self::Fr => &FR,
            Self::Es => &ES,
            Self::It => &IT,
            Self::Nl => &NL,
            Self::Pt => &PT,
            Self::Ja => &JA,
            Self::Zh => &ZH,
        }
    }

    /// Detect from the process locale environment, defaulting to English
    pub fn detect() -> Self {
        Self::detect_with(|var| env::var(var).ok())
    }

    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        LANGUAGE_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .flat_map(|value| {
                // LANGUAGE is a colon-separated priority list
                value
                    .split([':', ','])
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .find_map(|candidate| normalize_lang(&candidate).and_then(|c| Self::from_code(&c)))
            .unwrap_or_default()
    }
}

/// Reduce a locale string like `de_DE.UTF-8` or `pt-BR` to its language code
pub fn normalize_lang(value: &str) -> Option<String> {
    let code = value
        .trim()
        .split(['_', '-', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    (!code.is_empty()).then_some(code)
}
