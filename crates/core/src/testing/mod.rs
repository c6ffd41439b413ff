//! Testing utilities and mock implementations.
//!
//! [`MockRunner`] stands in for the external engine so the encode pipeline
//! can be exercised without ffmpeg installed.

mod mock_runner;

pub use mock_runner::{MockRunner, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::profile::{GlobalArgument, OutputArgs, Profile};

    /// Create a test profile with reasonable defaults.
    pub fn profile(name: &str, extension: &str, setup: &str) -> Profile {
        Profile {
            name: name.to_string(),
            codec: extension.trim_start_matches('.').to_string(),
            extension: extension.to_string(),
            output_args: OutputArgs::Encoded(setup.to_string()),
            size_factor: 0.5,
            cpu_factor: 1.0,
            description: String::new(),
        }
    }

    /// The 320 kbps MP3 profile used across pipeline tests.
    pub fn mp3_profile() -> Profile {
        profile("MP3 Standard 320kbps", ".mp3", "c=libmp3lame,b=320k")
    }

    /// Create a global argument.
    pub fn global_argument(name: &str, default: &str) -> GlobalArgument {
        GlobalArgument {
            name: name.to_string(),
            default: default.to_string(),
            description: String::new(),
        }
    }

    /// A minimal PCM WAV file: 44-byte RIFF header followed by `samples`
    /// 16-bit mono samples at 8 kHz.
    pub fn wav_bytes(samples: u32) -> Vec<u8> {
        let data_len = samples * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&8000u32.to_le_bytes());
        bytes.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
        bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        bytes
    }

    /// A minimal MPEG-1 Layer III stream of `frames` silent 128 kbps frames.
    pub fn mp3_bytes(frames: usize) -> Vec<u8> {
        const FRAME_LEN: usize = 417;
        let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
        for _ in 0..frames {
            bytes.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
            bytes.resize(bytes.len() + FRAME_LEN - 4, 0);
        }
        bytes
    }

    /// A FLAC stream holding only a STREAMINFO block (44.1 kHz, stereo,
    /// 16-bit) followed by a few bytes of frame data.
    pub fn flac_bytes() -> Vec<u8> {
        let mut bytes = b"fLaC".to_vec();
        bytes.push(0x80); // last metadata block, STREAMINFO
        bytes.extend_from_slice(&34u32.to_be_bytes()[1..]);
        bytes.extend_from_slice(&4096u16.to_be_bytes()); // min block size
        bytes.extend_from_slice(&4096u16.to_be_bytes()); // max block size
        bytes.extend_from_slice(&[0; 6]); // frame sizes unknown
        let packed: u64 = (44_100u64 << 44) | (1 << 41) | (15 << 36);
        bytes.extend_from_slice(&packed.to_be_bytes());
        bytes.extend_from_slice(&[0; 16]); // MD5
        bytes.extend_from_slice(&[0xFF, 0xF8, 0x69, 0x08, 0x00, 0x00]);
        bytes.resize(bytes.len() + 64, 0);
        bytes
    }

    /// An AIFF file with COMM and SSND chunks for `samples` 16-bit mono
    /// frames at 44.1 kHz.
    pub fn aiff_bytes(samples: u32) -> Vec<u8> {
        let mut comm = Vec::with_capacity(18);
        comm.extend_from_slice(&1u16.to_be_bytes());
        comm.extend_from_slice(&samples.to_be_bytes());
        comm.extend_from_slice(&16u16.to_be_bytes());
        // 44100 as an 80-bit extended float
        comm.extend_from_slice(&[0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]);

        let mut ssnd = vec![0u8; 8]; // offset and block size
        ssnd.resize(8 + samples as usize * 2, 0);

        let mut chunks = iff_chunk(b"COMM", &comm);
        chunks.extend(iff_chunk(b"SSND", &ssnd));

        let mut bytes = b"FORM".to_vec();
        bytes.extend_from_slice(&(4 + chunks.len() as u32).to_be_bytes());
        bytes.extend_from_slice(b"AIFF");
        bytes.extend(chunks);
        bytes
    }

    fn iff_chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut chunk = id.to_vec();
        chunk.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        chunk.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            chunk.push(0);
        }
        chunk
    }

    /// A raw ADTS stream of `frames` AAC-LC frames (44.1 kHz, stereo).
    pub fn aac_bytes(frames: usize) -> Vec<u8> {
        const FRAME_LEN: usize = 192;
        let len = FRAME_LEN as u16;
        let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
        for _ in 0..frames {
            bytes.extend_from_slice(&[
                0xFF,
                0xF1, // MPEG-4, no CRC
                0x50, // LC, 44.1 kHz
                0x80 | (len >> 11) as u8,
                (len >> 3) as u8,
                ((len & 0x7) << 5) as u8 | 0x1F,
                0xFC,
            ]);
            bytes.resize(bytes.len() + FRAME_LEN - 7, 0);
        }
        bytes
    }

    /// An M4A file with one empty AAC sound track and no `udta`.
    pub fn m4a_bytes() -> Vec<u8> {
        let mut ftyp = b"M4A ".to_vec();
        ftyp.extend_from_slice(&0u32.to_be_bytes());
        ftyp.extend_from_slice(b"M4A mp42isom");

        let mut mvhd = vec![0u8; 12];
        mvhd.extend_from_slice(&1000u32.to_be_bytes()); // timescale
        mvhd.extend_from_slice(&0u32.to_be_bytes()); // duration
        mvhd.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // rate
        mvhd.extend_from_slice(&0x0100u16.to_be_bytes()); // volume
        mvhd.extend_from_slice(&[0; 10]);
        mvhd.extend_from_slice(&IDENTITY_MATRIX);
        mvhd.extend_from_slice(&[0; 24]);
        mvhd.extend_from_slice(&2u32.to_be_bytes()); // next track id

        let mut tkhd = vec![0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0];
        tkhd.extend_from_slice(&1u32.to_be_bytes()); // track id
        tkhd.extend_from_slice(&[0; 4 + 4 + 8 + 2 + 2]);
        tkhd.extend_from_slice(&0x0100u16.to_be_bytes());
        tkhd.extend_from_slice(&[0; 2]);
        tkhd.extend_from_slice(&IDENTITY_MATRIX);
        tkhd.extend_from_slice(&[0; 8]); // width, height

        let mut mdhd = vec![0u8; 12];
        mdhd.extend_from_slice(&44_100u32.to_be_bytes());
        mdhd.extend_from_slice(&0u32.to_be_bytes());
        mdhd.extend_from_slice(&0x55C4u16.to_be_bytes()); // "und"
        mdhd.extend_from_slice(&[0; 2]);

        let mut hdlr = vec![0u8; 8];
        hdlr.extend_from_slice(b"soun");
        hdlr.extend_from_slice(&[0; 13]);

        let mut mp4a = vec![0u8; 6];
        mp4a.extend_from_slice(&1u16.to_be_bytes()); // data reference index
        mp4a.extend_from_slice(&[0; 8]);
        mp4a.extend_from_slice(&2u16.to_be_bytes()); // channels
        mp4a.extend_from_slice(&16u16.to_be_bytes()); // sample size
        mp4a.extend_from_slice(&[0; 4]);
        mp4a.extend_from_slice(&(44_100u32 << 16).to_be_bytes());

        let mut stsd = vec![0, 0, 0, 0, 0, 0, 0, 1];
        stsd.extend(mp4_atom(b"mp4a", &mp4a));

        let empty_table = [0u8; 8];
        let stbl = [
            mp4_atom(b"stsd", &stsd),
            mp4_atom(b"stts", &empty_table),
            mp4_atom(b"stsc", &empty_table),
            mp4_atom(b"stsz", &[0u8; 12]),
            mp4_atom(b"stco", &empty_table),
        ]
        .concat();

        let mut dref = vec![0, 0, 0, 0, 0, 0, 0, 1];
        dref.extend(mp4_atom(b"url ", &[0, 0, 0, 1]));

        let minf = [
            mp4_atom(b"smhd", &[0u8; 8]),
            mp4_atom(b"dinf", &mp4_atom(b"dref", &dref)),
            mp4_atom(b"stbl", &stbl),
        ]
        .concat();
        let mdia = [
            mp4_atom(b"mdhd", &mdhd),
            mp4_atom(b"hdlr", &hdlr),
            mp4_atom(b"minf", &minf),
        ]
        .concat();
        let trak = [mp4_atom(b"tkhd", &tkhd), mp4_atom(b"mdia", &mdia)].concat();
        let moov = [mp4_atom(b"mvhd", &mvhd), mp4_atom(b"trak", &trak)].concat();

        [
            mp4_atom(b"ftyp", &ftyp),
            mp4_atom(b"moov", &moov),
            mp4_atom(b"mdat", &[0u8; 16]),
        ]
        .concat()
    }

    const IDENTITY_MATRIX: [u8; 36] = [
        0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
        0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, //
        0, 0, 0, 0, 0, 0, 0, 0, 0x40, 0, 0, 0,
    ];

    fn mp4_atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut atom = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        atom.extend_from_slice(kind);
        atom.extend_from_slice(payload);
        atom
    }
}
