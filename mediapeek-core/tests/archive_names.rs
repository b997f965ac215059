//! First-entry name extraction over hand-built ZIP and TAR prefixes.

use mediapeek_core::{
    ContainerKind, detect_container, extract_first_filename, is_valid_filename,
};

fn zip_entry(name: &str, payload: &[u8], extra: &[u8]) -> Vec<u8> {
    let mut entry = vec![0u8; 30];
    entry[..4].copy_from_slice(&0x0403_4b50u32.to_le_bytes());
    entry[18..22].copy_from_slice(&(payload.len() as u32).to_le_bytes());
    entry[26..28].copy_from_slice(&(name.len() as u16).to_le_bytes());
    entry[28..30].copy_from_slice(&(extra.len() as u16).to_le_bytes());
    entry.extend_from_slice(name.as_bytes());
    entry.extend_from_slice(extra);
    entry.extend_from_slice(payload);
    entry
}

fn tar_header(name: &[u8], size: usize, typeflag: u8, magic: &[u8; 6]) -> Vec<u8> {
    let mut header = vec![0u8; 512];
    header[..name.len()].copy_from_slice(name);
    let size = format!("{size:011o}\0");
    header[124..136].copy_from_slice(size.as_bytes());
    header[156] = typeflag;
    header[257..263].copy_from_slice(magic);
    header
}

fn padded(data: &[u8]) -> Vec<u8> {
    let mut block = data.to_vec();
    block.resize(data.len().div_ceil(512) * 512, 0);
    block
}

#[test]
fn flat_zip_reports_its_only_entry() {
    let archive = zip_entry("Show.S01E01.mkv", b"\x1a\x45\xdf\xa3", b"");
    assert_eq!(detect_container(&archive), ContainerKind::Zip);
    assert_eq!(
        extract_first_filename(&archive).as_deref(),
        Some("Show.S01E01.mkv")
    );
}

#[test]
fn zip_directories_are_skipped() {
    let mut archive = zip_entry("Season 1/", b"", b"");
    archive.extend(zip_entry("extras/", b"", b"\x55\x54\x05\x00\x01"));
    archive.extend(zip_entry("Season 1/Episode 1.mkv", b"payload", b""));

    assert_eq!(
        extract_first_filename(&archive).as_deref(),
        Some("Season 1/Episode 1.mkv")
    );
}

#[test]
fn zip_entry_past_the_prefix_is_none() {
    let mut archive = zip_entry("folder/", b"", b"");
    let next = zip_entry("folder/movie.mp4", b"", b"");
    archive.extend_from_slice(&next[..20]);
    assert_eq!(extract_first_filename(&archive), None);
}

#[test]
fn tar_directory_is_skipped() {
    let mut archive = tar_header(b"movies/", 0, b'5', b"ustar\0");
    archive.extend(tar_header(b"movies/Heat.1995.mkv", 4, b'0', b"ustar\0"));
    archive.extend(padded(b"data"));

    assert_eq!(detect_container(&archive), ContainerKind::Tar);
    assert_eq!(
        extract_first_filename(&archive).as_deref(),
        Some("movies/Heat.1995.mkv")
    );
}

#[test]
fn tar_ustar_prefix_is_joined() {
    let mut header = tar_header(b"file.mkv", 0, b'0', b"ustar\0");
    header[345..351].copy_from_slice(b"a/long");
    assert_eq!(
        extract_first_filename(&header).as_deref(),
        Some("a/long/file.mkv")
    );
}

#[test]
fn gnu_long_name_is_read_from_the_data_block() {
    let long_name = format!("{}/{}.mkv", "nested".repeat(20), "x".repeat(40));
    assert!(long_name.len() > 100);

    let mut data = long_name.clone().into_bytes();
    data.push(0);
    let mut archive =
        tar_header(b"././@LongLink", data.len(), b'L', b"ustar ");
    archive.extend(padded(&data));
    archive.extend(tar_header(&long_name.as_bytes()[..100], 0, b'0', b"ustar "));

    assert_eq!(extract_first_filename(&archive), Some(long_name));
}

#[test]
fn zeroed_buffer_is_not_an_archive() {
    let archive = vec![0u8; 2048];
    assert_eq!(extract_first_filename(&archive), None);
}

#[test]
fn media_and_junk_have_no_archive_name() {
    let mkv = [0x1A, 0x45, 0xDF, 0xA3, 0x01, 0x00, 0x00, 0x00];
    let mut mp4 = vec![0, 0, 0, 0x20];
    mp4.extend_from_slice(b"ftypisom");

    assert_eq!(detect_container(&mkv), ContainerKind::Matroska);
    assert_eq!(detect_container(&mp4), ContainerKind::IsoMedia);
    assert_eq!(extract_first_filename(&mkv), None);
    assert_eq!(extract_first_filename(&mp4), None);
    assert_eq!(extract_first_filename(b"not an archive at all"), None);
    assert_eq!(extract_first_filename(&[]), None);
}

#[test]
fn media_signature_wins_over_later_archive_structure() {
    let mut mkv = tar_header(b"movie.mkv", 0, b'0', b"ustar\0");
    mkv[..4].copy_from_slice(&[0x1A, 0x45, 0xDF, 0xA3]);
    assert_eq!(mkv.len(), 512);
    assert_eq!(detect_container(&mkv), ContainerKind::Matroska);
    assert_eq!(extract_first_filename(&mkv), None);

    let mut mp4 = vec![0, 0, 0, 0x20];
    mp4.extend_from_slice(b"ftypisom");
    mp4.resize(0x20, 0);
    mp4.extend(zip_entry("movie.mkv", b"payload", b""));
    mp4.resize(512, 0);
    assert_eq!(detect_container(&mp4), ContainerKind::IsoMedia);
    assert_eq!(extract_first_filename(&mp4), None);
}

#[test]
fn extracted_names_pass_validation() {
    let archive = zip_entry("Café - Le Film.mkv", b"", b"");
    let name = extract_first_filename(&archive).expect("zip entry name");
    assert!(is_valid_filename(&name));

    for entry in ["ÄÖÜ.mkv", "Éé.mp4"] {
        let archive = zip_entry(entry, b"", b"");
        let name = extract_first_filename(&archive).expect("zip entry name");
        assert_eq!(name, entry);
        assert!(is_valid_filename(&name), "{entry:?} was rejected");
    }
}
