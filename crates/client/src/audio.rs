use cellwars::SoundKey;

/// Stands in for a mixer: every requested sound is logged by name.
#[derive(Debug, Default)]
pub struct AudioSink {
    played: u64,
}

impl AudioSink {
    pub fn play(&mut self, sounds: impl IntoIterator<Item = SoundKey>) {
        for sound in sounds {
            self.played += 1;
            log::debug!("Sound #{}: {}", self.played, sound.name());
        }
    }
}
