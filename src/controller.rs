use tracing::{error, info, warn};

use crate::api::FeedbackService;
use crate::page::*;
use crate::render::{CorrectionView, EvaluationView};
use crate::session::SessionState;
use crate::speech::*;

/// Drives one learner's interaction: text feedback, listening to the corrected
/// sentence, and checking a spoken attempt.
///
/// Requests are not tagged or cancelled; if the caller fires a second request
/// before the first resolves, whichever finishes last owns the region.
pub struct FeedbackController<S, T, R> {
    service: S,
    synthesizer: Capability<T>,
    recognizer: Capability<R>,
    session: SessionState,
    page: Page,
    voices: Vec<Voice>,
}

impl<S, T, R> FeedbackController<S, T, R>
where
    S: FeedbackService,
    T: SpeechSynthesizer,
    R: SpeechRecognizer,
{
    pub fn new(service: S, synthesizer: Capability<T>, recognizer: Capability<R>) -> Self {
        let mut controller = FeedbackController {
            service,
            synthesizer,
            recognizer,
            session: SessionState::new(),
            page: Page::new(),
            voices: Vec::new(),
        };
        controller.refresh_voices();
        controller
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn set_sentence(&mut self, text: impl Into<String>) {
        self.page.sentence_input = text.into();
    }

    /// Re-reads the engine's voice list; engines may publish voices late.
    pub fn refresh_voices(&mut self) {
        if let Capability::Available(synth) = &self.synthesizer {
            self.voices = synth.voices();
        }
    }

    /// Feedback-request trigger: submits whatever is in the sentence field.
    pub async fn request_feedback(&mut self) {
        let sentence = self.page.sentence_input.clone();
        self.submit_sentence_for_feedback(&sentence).await;
    }

    pub async fn submit_sentence_for_feedback(&mut self, sentence: &str) {
        // The listen control only exists alongside a rendered correction.
        self.page.listen_target = None;

        let sentence = sentence.trim();
        if sentence.is_empty() {
            self.page
                .feedback
                .show(RegionContent::message(WRITE_SENTENCE_FIRST), InteractionState::Idle);
            return;
        }

        self.page
            .feedback
            .show(RegionContent::message(ANALYZING_SENTENCE), InteractionState::Analyzing);

        let response = match self.service.correct(sentence).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "correction request failed");
                self.page
                    .feedback
                    .show(RegionContent::message(FEEDBACK_FAILED), InteractionState::Errored);
                return;
            }
        };

        if let Some(message) = response.service_error() {
            warn!(error = message, "correction service reported an error");
            self.page.feedback.show(
                RegionContent::ServiceError(message.to_string()),
                InteractionState::Errored,
            );
            return;
        }

        let corrected = crate::models::non_empty(&response.corrected)
            .unwrap_or(sentence)
            .to_string();
        info!(%corrected, "correction received");

        self.session.set(corrected.clone());
        let view = CorrectionView::build(&response, &corrected);
        self.page
            .feedback
            .show(RegionContent::Correction(view), InteractionState::Rendered);
        self.page.listen_target = Some(corrected);
    }

    /// Listen trigger: plays the sentence bound by the last correction.
    pub fn listen(&mut self) {
        if let Some(text) = self.page.listen_target.clone() {
            self.play_spoken_audio(&text);
        }
    }

    pub fn play_spoken_audio(&mut self, text: &str) {
        let synth = match self.synthesizer.get_mut() {
            Ok(synth) => synth,
            Err(e) => {
                warn!(error = %e, "speech synthesis requested");
                self.page.notice = Some(SYNTHESIS_UNSUPPORTED.to_string());
                return;
            }
        };

        if self.voices.is_empty() {
            self.voices = synth.voices();
        }
        let utterance = finnish_utterance(text, &self.voices);

        synth.cancel();
        if let Err(e) = synth.speak(utterance) {
            error!(error = %e, "could not start speech synthesis");
        }
    }

    /// Starts listening and returns at once. Pass the returned session to
    /// [`finish_pronunciation_check`](Self::finish_pronunciation_check).
    pub fn start_pronunciation_check(&mut self) -> Option<PendingRecognition> {
        let recognizer = match self.recognizer.get_mut() {
            Ok(recognizer) => recognizer,
            Err(e) => {
                warn!(error = %e, "speech recognition requested");
                self.page.speech_status = RECOGNITION_UNSUPPORTED.to_string();
                return None;
            }
        };

        match recognizer.start(RecognitionConfig::default()) {
            Ok(pending) => {
                self.page.speech_status = LISTENING.to_string();
                Some(pending)
            }
            Err(e) => {
                error!(error = %e, "could not start speech recognition");
                self.page.speech_status = format!("Speech recognition error: {}", e);
                None
            }
        }
    }

    pub async fn finish_pronunciation_check(&mut self, pending: PendingRecognition) {
        match pending.outcome().await {
            RecognitionOutcome::Transcript(spoken) => self.evaluate_spoken(&spoken).await,
            RecognitionOutcome::Error(code) => {
                error!(%code, "speech recognition error");
                self.page.speech_status = format!("Speech recognition error: {}", code);
            }
            RecognitionOutcome::Ended => {
                self.page.speech_status = STOPPED_LISTENING.to_string();
            }
        }
    }

    /// Start and finish in one go.
    pub async fn check_pronunciation(&mut self) {
        if let Some(pending) = self.start_pronunciation_check() {
            self.finish_pronunciation_check(pending).await;
        }
    }

    async fn evaluate_spoken(&mut self, spoken: &str) {
        self.page.speech_status = format!("You said (recognized): \"{}\"", spoken);

        let target = match self.session.get() {
            Some(corrected) => corrected.to_string(),
            None => self.page.sentence_input.trim().to_string(),
        };

        if target.is_empty() {
            self.page
                .pronunciation
                .show(RegionContent::message(GET_FEEDBACK_FIRST), InteractionState::Idle);
            return;
        }

        self.page.pronunciation.show(
            RegionContent::message(ANALYZING_PRONUNCIATION),
            InteractionState::Analyzing,
        );

        match self.service.evaluate_pronunciation(&target, spoken).await {
            Ok(response) => {
                if let Some(message) = response.service_error() {
                    warn!(error = message, "pronunciation service reported an error");
                    self.page.pronunciation.show(
                        RegionContent::ServiceError(message.to_string()),
                        InteractionState::Errored,
                    );
                    return;
                }
                let view = EvaluationView::build(&response);
                self.page
                    .pronunciation
                    .show(RegionContent::Evaluation(view), InteractionState::Rendered);
            }
            Err(e) => {
                error!(error = %e, "pronunciation evaluation failed");
                self.page
                    .pronunciation
                    .show(RegionContent::message(PRONUNCIATION_FAILED), InteractionState::Errored);
            }
        }
    }

    pub fn reset_interaction(&mut self) {
        self.page.reset();
        self.session.clear();
        if let Ok(synth) = self.synthesizer.get_mut() {
            synth.cancel();
        }
    }
}
