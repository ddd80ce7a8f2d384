use anyhow::Result;
use azure_speech::{Auth, stream::StreamExt, synthesizer};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::speech::{SpeechSynthesizer, Utterance, Voice};

/// Azure TTS settings.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub subscription_key: String,
    pub region: String,
    pub voice_name: String,
    pub output_dir: PathBuf,
}

impl TtsConfig {
    /// `None` when the key or region is missing.
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        if !config.has_azure_credentials() {
            return None;
        }
        Some(Self {
            subscription_key: config.azure_speech_key.clone(),
            region: config.azure_speech_region.clone(),
            voice_name: config.azure_voice_name.clone(),
            output_dir: PathBuf::from(&config.output_dir),
        })
    }
}

// Neural voices the service offers for Finnish. Anything else falls back to
// the configured default voice.
const FINNISH_VOICES: [&str; 3] = ["fi-FI-SelmaNeural", "fi-FI-HarriNeural", "fi-FI-NooraNeural"];

fn azure_voice(name: &str) -> Option<synthesizer::Voice> {
    match name {
        "fi-FI-SelmaNeural" => Some(synthesizer::Voice::FiFiSelmaNeural),
        "fi-FI-HarriNeural" => Some(synthesizer::Voice::FiFiHarriNeural),
        "fi-FI-NooraNeural" => Some(synthesizer::Voice::FiFiNooraNeural),
        _ => None,
    }
}

/// Azure neural-voice synthesizer.
///
/// Every utterance is synthesized on its own task and written to
/// `<output_dir>/utterance-<n>.wav`. Only one task is alive at a time.
pub struct AzureTts {
    config: TtsConfig,
    current: Option<JoinHandle<()>>,
    spoken: u64,
}

impl AzureTts {
    pub fn new(config: TtsConfig) -> Self {
        Self {
            config,
            current: None,
            spoken: 0,
        }
    }

    fn next_output_file(&mut self) -> PathBuf {
        self.spoken += 1;
        self.config.output_dir.join(format!("utterance-{}.wav", self.spoken))
    }
}

impl SpeechSynthesizer for AzureTts {
    fn voices(&self) -> Vec<Voice> {
        FINNISH_VOICES
            .iter()
            .map(|name| Voice::new(*name, "fi-FI"))
            .collect()
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            if !handle.is_finished() {
                debug!("cancelling utterance in progress");
            }
            handle.abort();
        }
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Synthesis(format!("no async runtime: {}", e)))?;

        self.cancel();

        let voice_name = utterance
            .voice
            .as_ref()
            .map(|v| v.name.clone())
            .unwrap_or_else(|| self.config.voice_name.clone());
        let output_file = self.next_output_file();
        let config = self.config.clone();

        self.current = Some(runtime.spawn(async move {
            match synthesize_text_to_file(&config, &voice_name, &utterance.text, &output_file).await {
                Ok(()) => info!(file = %output_file.display(), "utterance ready"),
                Err(e) => error!(error = %e, "speech synthesis failed"),
            }
        }));
        Ok(())
    }
}

/// Synthesizes `text` and writes the audio to `output_file`.
pub async fn synthesize_text_to_file(
    config: &TtsConfig,
    voice_name: &str,
    text: &str,
    output_file: &Path,
) -> Result<()> {
    let auth = Auth::from_subscription(config.region.clone(), config.subscription_key.clone());

    let voice = azure_voice(voice_name)
        .or_else(|| azure_voice(&config.voice_name))
        .unwrap_or(synthesizer::Voice::FiFiSelmaNeural);

    let synth_config = synthesizer::Config::new()
        .with_language(synthesizer::Language::FiFi)
        .with_voice(voice);

    let client = synthesizer::Client::connect(auth, synth_config).await?;

    let mut stream = client.synthesize(text).await?;

    let mut audio_data = Vec::new();

    while let Some(event_result) = stream.next().await {
        match event_result {
            Ok(synthesizer::Event::Synthesising(_, audio_chunk)) => {
                audio_data.extend_from_slice(&audio_chunk);
            }
            Ok(synthesizer::Event::Synthesised(_)) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(anyhow::anyhow!("synthesis failed: {}", e));
            }
        }
    }

    if audio_data.is_empty() {
        return Err(anyhow::anyhow!("no audio data received"));
    }

    save_audio_file(&audio_data, output_file)
}

fn save_audio_file(audio_data: &[u8], output_file: &Path) -> Result<()> {
    if let Some(parent) = output_file.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("could not create directory {}: {}", parent.display(), e))?;
    }

    std::fs::write(output_file, audio_data)
        .map_err(|e| anyhow::anyhow!("could not write audio to {}: {}", output_file.display(), e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::select_voice;

    fn speech_config(key: &str) -> SpeechConfig {
        SpeechConfig {
            azure_speech_key: key.to_string(),
            azure_speech_region: "northeurope".to_string(),
            ..SpeechConfig::default()
        }
    }

    #[test]
    fn missing_key_means_no_tts() {
        assert!(TtsConfig::from_config(&speech_config("")).is_none());
        assert!(TtsConfig::from_config(&speech_config("secret")).is_some());
    }

    #[test]
    fn offered_voices_are_finnish() {
        let tts = AzureTts::new(TtsConfig::from_config(&speech_config("secret")).unwrap());
        let voices = tts.voices();
        assert_eq!(voices.len(), 3);
        assert_eq!(select_voice(&voices).unwrap().name, "fi-FI-SelmaNeural");
    }

    #[test]
    fn every_offered_voice_maps_to_an_azure_voice() {
        for name in FINNISH_VOICES {
            assert!(azure_voice(name).is_some(), "{name}");
        }
        assert!(azure_voice("en-US-JennyNeural").is_none());
    }

    #[test]
    fn output_files_are_numbered() {
        let mut tts = AzureTts::new(TtsConfig::from_config(&speech_config("secret")).unwrap());
        assert_eq!(tts.next_output_file(), PathBuf::from("audio/utterance-1.wav"));
        assert_eq!(tts.next_output_file(), PathBuf::from("audio/utterance-2.wav"));
    }

    #[test]
    fn speak_outside_runtime_fails_cleanly() {
        let mut tts = AzureTts::new(TtsConfig::from_config(&speech_config("secret")).unwrap());
        let utterance = Utterance {
            text: "Hei".into(),
            lang: "fi-FI".into(),
            voice: None,
        };
        assert!(matches!(tts.speak(utterance), Err(SpeechError::Synthesis(_))));
    }
}
