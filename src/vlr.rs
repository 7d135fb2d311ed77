use byteorder::{LittleEndian, ReadBytesExt};
use laz::LazVlr;
use std::fmt;
use std::io::Read;

const LASZIP_USER_ID: &str = "laszip encoded";
const LASZIP_RECORD_ID: u16 = 22204;

/// LAS Variable Length Record, as stored between the header and the point data
pub struct Vlr {
    user_id: [u8; 16],
    pub(crate) record_id: u16,
    description: [u8; 32],
    pub(crate) data: Vec<u8>,
}

impl Vlr {
    pub fn read_from<R: Read>(src: &mut R) -> std::io::Result<Self> {
        src.read_u16::<LittleEndian>()?; // reserved
        let mut user_id = [0u8; 16];
        src.read_exact(&mut user_id)?;

        let record_id = src.read_u16::<LittleEndian>()?;
        let record_length = src.read_u16::<LittleEndian>()?;

        let mut description = [0u8; 32];
        src.read_exact(&mut description)?;

        let mut data = vec![0u8; record_length as usize];
        src.read_exact(&mut data)?;

        Ok(Self {
            user_id,
            record_id,
            description,
            data,
        })
    }

    pub fn user_id(&self) -> String {
        trim_nul(&self.user_id)
    }

    pub fn description(&self) -> String {
        trim_nul(&self.description)
    }

    pub fn is_laszip(&self) -> bool {
        self.record_id == LASZIP_RECORD_ID && self.user_id() == LASZIP_USER_ID
    }
}

fn trim_nul(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

impl fmt::Debug for Vlr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vlr")
            .field("user_id", &self.user_id())
            .field("record_id", &self.record_id)
            .field("description", &self.description())
            .field("data", &format_args!("[u8; {}]", self.data.len()))
            .finish()
    }
}

/// Reads `count` VLRs from `src` and returns the parsed laszip VLR, if any.
///
/// The other records are skipped.
pub fn read_laszip_vlr<R: Read>(src: &mut R, count: u32) -> crate::Result<Option<LazVlr>> {
    let mut laszip_vlr = None;
    for _ in 0..count {
        let vlr = Vlr::read_from(src)?;
        if vlr.is_laszip() {
            laszip_vlr = Some(LazVlr::read_from(vlr.data.as_slice())?);
        } else {
            log::debug!("Ignoring VLR {}/{}", vlr.user_id(), vlr.record_id);
        }
    }
    Ok(laszip_vlr)
}
