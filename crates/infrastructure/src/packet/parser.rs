use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;
use pnet::packet::Packet;

const DNS_PORT: u16 = 53;
const DNS_HEADER_LEN: usize = 12;
const MAX_DOMAIN_LEN: usize = 253;

/// Extract the destination domain from a raw IPv4 packet, if there is one.
///
/// Two sources are recognised: the first question of a DNS query (UDP/53)
/// and the SNI extension of a TLS ClientHello (any TCP payload). The result
/// is lowercased. Anything that fails to parse at any offset yields `None`;
/// this function must survive arbitrary bytes without panicking.
pub fn extract_domain(payload: &[u8]) -> Option<String> {
    let ipv4 = Ipv4Packet::new(payload)?;

    match ipv4.get_next_level_protocol() {
        IpNextHeaderProtocols::Udp => {
            let udp = UdpPacket::new(ipv4.payload())?;
            if udp.get_destination() != DNS_PORT {
                return None;
            }
            parse_dns_question(udp.payload())
        }
        IpNextHeaderProtocols::Tcp => {
            let tcp = TcpPacket::new(ipv4.payload())?;
            let data = tcp.payload();
            if data.is_empty() {
                return None;
            }
            parse_tls_client_hello(data)
        }
        _ => None,
    }
}

/// Decode the QNAME of the first question in a DNS message.
///
/// Labels are length-prefixed; a zero length terminates the name. Compressed
/// names (0xC0 pointer bits) never appear in a question we care about and
/// abort the parse.
fn parse_dns_question(payload: &[u8]) -> Option<String> {
    if payload.len() < DNS_HEADER_LEN {
        return None;
    }

    let qdcount = u16::from_be_bytes([payload[4], payload[5]]);
    if qdcount == 0 {
        return None;
    }

    let mut pos = DNS_HEADER_LEN;
    let mut name = String::new();

    loop {
        let len = *payload.get(pos)? as usize;
        if len == 0 {
            break;
        }
        if len & 0xC0 != 0 {
            return None;
        }
        pos += 1;

        let label = payload.get(pos..pos + len)?;
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(std::str::from_utf8(label).ok()?);
        pos += len;

        if name.len() > MAX_DOMAIN_LEN {
            return None;
        }
    }

    if name.is_empty() {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

/// Walk a TLS ClientHello and pull the hostname out of the SNI extension.
///
/// Record layout: content type 0x16, version (2), record length (2), then a
/// handshake message 0x01 with a 3-byte length, client version (2), random
/// (32), session id, cipher suites, compression methods, and finally the
/// extension list. Every advance is bound-checked against the buffer; SNI
/// split across TCP segments is out of scope and parses as `None`.
fn parse_tls_client_hello(data: &[u8]) -> Option<String> {
    if data.len() < 5 || data[0] != 0x16 {
        return None;
    }

    // Record header (5) then handshake header (4).
    let mut pos = 5;
    if *data.get(pos)? != 0x01 {
        return None;
    }
    pos += 4;

    // Client version + random.
    pos += 2 + 32;

    // Session ID.
    let session_id_len = *data.get(pos)? as usize;
    pos += 1 + session_id_len;

    // Cipher suites.
    let hi = *data.get(pos)? as usize;
    let lo = *data.get(pos + 1)? as usize;
    pos += 2 + ((hi << 8) | lo);

    // Compression methods.
    let compression_len = *data.get(pos)? as usize;
    pos += 1 + compression_len;

    // Extensions.
    let hi = *data.get(pos)? as usize;
    let lo = *data.get(pos + 1)? as usize;
    let extensions_len = (hi << 8) | lo;
    pos += 2;

    let end = (pos + extensions_len).min(data.len());

    while pos + 4 <= end {
        let ext_type = u16::from_be_bytes([data[pos], data[pos + 1]]);
        let ext_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;

        if ext_type == 0x0000 {
            return parse_sni_extension(data.get(pos..(pos + ext_len).min(end))?);
        }

        pos += ext_len;
    }

    None
}

/// SNI extension value: list length (2), name type (1, 0x00 = host_name),
/// name length (2), name bytes.
fn parse_sni_extension(data: &[u8]) -> Option<String> {
    let mut pos = 2;

    if *data.get(pos)? != 0x00 {
        return None;
    }
    pos += 1;

    let name_len = u16::from_be_bytes([*data.get(pos)?, *data.get(pos + 1)?]) as usize;
    pos += 2;

    let name = data.get(pos..pos + name_len)?;
    let hostname = std::str::from_utf8(name).ok()?;
    if hostname.is_empty() {
        return None;
    }
    Some(hostname.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── test packet builders ───────────────────────────────────────

    fn build_ipv4(protocol: u8, l4: &[u8]) -> Vec<u8> {
        let total_len = 20 + l4.len();
        let mut pkt = vec![0u8; 20];
        pkt[0] = 0x45; // version 4, ihl 5
        pkt[2] = (total_len >> 8) as u8;
        pkt[3] = total_len as u8;
        pkt[8] = 64; // ttl
        pkt[9] = protocol;
        pkt[12..16].copy_from_slice(&[192, 168, 1, 10]);
        pkt[16..20].copy_from_slice(&[1, 1, 1, 1]);
        pkt.extend_from_slice(l4);
        pkt
    }

    fn build_udp_dns(qname: &str) -> Vec<u8> {
        let mut dns = vec![0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        for label in qname.split('.') {
            dns.push(label.len() as u8);
            dns.extend_from_slice(label.as_bytes());
        }
        dns.push(0x00);
        dns.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]); // QTYPE A, QCLASS IN

        let udp_len = 8 + dns.len();
        let mut udp = vec![0u8; 8];
        udp[0..2].copy_from_slice(&51000u16.to_be_bytes());
        udp[2..4].copy_from_slice(&53u16.to_be_bytes());
        udp[4..6].copy_from_slice(&(udp_len as u16).to_be_bytes());
        udp.extend_from_slice(&dns);

        build_ipv4(17, &udp)
    }

    fn build_tcp(payload: &[u8]) -> Vec<u8> {
        let mut tcp = vec![0u8; 20];
        tcp[0..2].copy_from_slice(&52000u16.to_be_bytes());
        tcp[2..4].copy_from_slice(&443u16.to_be_bytes());
        tcp[12] = 0x50; // data offset 5
        tcp.extend_from_slice(payload);
        build_ipv4(6, &tcp)
    }

    fn build_client_hello(hostname: &str) -> Vec<u8> {
        let name = hostname.as_bytes();
        let sni_value_len = 2 + 1 + 2 + name.len();
        let sni_list_len = 1 + 2 + name.len();
        let ext_data_len = 4 + sni_value_len;
        let ch_body_len = 2 + 32 + 1 + 4 + 2 + 2 + ext_data_len;
        let hs_len = 4 + ch_body_len;

        let mut pkt = Vec::new();
        pkt.push(0x16);
        pkt.extend_from_slice(&[0x03, 0x01]);
        pkt.extend_from_slice(&(hs_len as u16).to_be_bytes());

        pkt.push(0x01);
        pkt.push((ch_body_len >> 16) as u8);
        pkt.push((ch_body_len >> 8) as u8);
        pkt.push(ch_body_len as u8);

        pkt.extend_from_slice(&[0x03, 0x03]);
        pkt.extend_from_slice(&[0xAA; 32]);
        pkt.push(0x00); // empty session id
        pkt.extend_from_slice(&[0x00, 0x02, 0x00, 0x2f]); // one cipher suite
        pkt.push(0x01);
        pkt.push(0x00); // null compression

        pkt.extend_from_slice(&(ext_data_len as u16).to_be_bytes());
        pkt.extend_from_slice(&[0x00, 0x00]); // SNI extension type
        pkt.extend_from_slice(&(sni_value_len as u16).to_be_bytes());
        pkt.extend_from_slice(&(sni_list_len as u16).to_be_bytes());
        pkt.push(0x00); // host_name
        pkt.extend_from_slice(&(name.len() as u16).to_be_bytes());
        pkt.extend_from_slice(name);

        pkt
    }

    // ── DNS path ───────────────────────────────────────────────────

    #[test]
    fn dns_query_yields_qname() {
        let pkt = build_udp_dns("foo.bar");
        assert_eq!(extract_domain(&pkt).as_deref(), Some("foo.bar"));
    }

    #[test]
    fn dns_qname_is_lowercased() {
        let pkt = build_udp_dns("Ads.Example.COM");
        assert_eq!(extract_domain(&pkt).as_deref(), Some("ads.example.com"));
    }

    #[test]
    fn udp_to_other_port_is_ignored() {
        let mut pkt = build_udp_dns("foo.bar");
        // Rewrite the UDP destination port to 5353.
        pkt[22..24].copy_from_slice(&5353u16.to_be_bytes());
        assert_eq!(extract_domain(&pkt), None);
    }

    #[test]
    fn dns_with_zero_questions_is_ignored() {
        let mut pkt = build_udp_dns("foo.bar");
        pkt[20 + 8 + 4] = 0;
        pkt[20 + 8 + 5] = 0;
        assert_eq!(extract_domain(&pkt), None);
    }

    #[test]
    fn truncated_dns_is_ignored() {
        let pkt = build_udp_dns("foo.bar");
        for cut in 0..pkt.len() - 6 {
            // Any truncation must parse to None or a valid prefix, never panic.
            let _ = extract_domain(&pkt[..cut]);
        }
    }

    // ── TLS path ───────────────────────────────────────────────────

    #[test]
    fn client_hello_yields_sni() {
        let pkt = build_tcp(&build_client_hello("example.com"));
        assert_eq!(extract_domain(&pkt).as_deref(), Some("example.com"));
    }

    #[test]
    fn sni_is_lowercased() {
        let pkt = build_tcp(&build_client_hello("CDN.Example.COM"));
        assert_eq!(extract_domain(&pkt).as_deref(), Some("cdn.example.com"));
    }

    #[test]
    fn non_handshake_tcp_payload_is_ignored() {
        let pkt = build_tcp(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert_eq!(extract_domain(&pkt), None);
    }

    #[test]
    fn empty_tcp_payload_is_ignored() {
        let pkt = build_tcp(&[]);
        assert_eq!(extract_domain(&pkt), None);
    }

    #[test]
    fn truncated_client_hello_never_panics() {
        let hello = build_client_hello("example.com");
        for cut in 0..hello.len() {
            let pkt = build_tcp(&hello[..cut]);
            let _ = extract_domain(&pkt);
        }
    }

    #[test]
    fn garbage_is_ignored() {
        assert_eq!(extract_domain(&[]), None);
        assert_eq!(extract_domain(&[0x45]), None);

        let noise: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let _ = extract_domain(&noise);

        // Same noise wrapped in valid IPv4/TCP framing.
        let pkt = build_tcp(&noise[..1200]);
        let _ = extract_domain(&pkt);
    }
}
