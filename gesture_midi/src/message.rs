//! Raw MIDI channel messages, as written to an output port.

/// Controller number for channel volume.
pub const CHANNEL_VOLUME: u8 = 7;
/// Controller number for "all notes off".
pub const ALL_NOTES_OFF: u8 = 123;

/// Zero-based channel index of the General MIDI percussion channel (10).
pub const GM_DRUM_CHANNEL: u8 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn        { channel: u8, note: u8, velocity: u8 },
    NoteOff       { channel: u8, note: u8 },
    ProgramChange { channel: u8, program: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiMessage {
    /// Channel volume for a gain in `[0, 1]`.
    pub fn volume(channel: u8, gain: f32) -> Self {
        MidiMessage::ControlChange { channel, controller: CHANNEL_VOLUME, value: gain_to_cc(gain) }
    }

    pub fn all_notes_off(channel: u8) -> Self {
        MidiMessage::ControlChange { channel, controller: ALL_NOTES_OFF, value: 0 }
    }

    /// Wire bytes.  Channels wrap into 0–15 and data bytes are masked to
    /// 7 bits.
    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            MidiMessage::NoteOn { channel, note, velocity } =>
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOff { channel, note } =>
                vec![0x80 | (channel & 0x0F), note & 0x7F, 0],
            MidiMessage::ProgramChange { channel, program } =>
                vec![0xC0 | (channel & 0x0F), program & 0x7F],
            MidiMessage::ControlChange { channel, controller, value } =>
                vec![0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F],
        }
    }
}

/// Map a gain in `[0, 1]` onto a 7-bit controller value; NaN is silence.
pub fn gain_to_cc(gain: f32) -> u8 {
    if gain.is_nan() {
        return 0;
    }
    (gain.clamp(0.0, 1.0) * 127.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_off_bytes() {
        let on = MidiMessage::NoteOn { channel: GM_DRUM_CHANNEL, note: 38, velocity: 100 };
        assert_eq!(on.to_bytes(), vec![0x99, 38, 100]);
        let off = MidiMessage::NoteOff { channel: GM_DRUM_CHANNEL, note: 38 };
        assert_eq!(off.to_bytes(), vec![0x89, 38, 0]);
    }

    #[test]
    fn program_change_is_two_bytes() {
        let pc = MidiMessage::ProgramChange { channel: 0, program: 48 };
        assert_eq!(pc.to_bytes(), vec![0xC0, 48]);
    }

    #[test]
    fn volume_controller() {
        assert_eq!(MidiMessage::volume(1, 1.0).to_bytes(), vec![0xB1, 7, 127]);
        assert_eq!(MidiMessage::volume(1, 0.0).to_bytes(), vec![0xB1, 7, 0]);
        assert_eq!(MidiMessage::all_notes_off(9).to_bytes(), vec![0xB9, 123, 0]);
    }

    #[test]
    fn gain_is_clamped() {
        assert_eq!(gain_to_cc(2.0), 127);
        assert_eq!(gain_to_cc(-1.0), 0);
        assert_eq!(gain_to_cc(0.5), 64);
        assert_eq!(gain_to_cc(f32::NAN), 0);
    }

    #[test]
    fn out_of_range_fields_are_masked() {
        let on = MidiMessage::NoteOn { channel: 17, note: 200, velocity: 255 };
        let bytes = on.to_bytes();
        assert_eq!(bytes[0], 0x91);
        assert!(bytes[1] < 128 && bytes[2] < 128);
    }
}
